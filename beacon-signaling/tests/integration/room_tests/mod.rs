pub mod test_concurrent_joiners;
