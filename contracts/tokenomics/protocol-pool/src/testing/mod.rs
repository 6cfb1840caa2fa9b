mod distribution_tests;
pub mod mock_bank;
