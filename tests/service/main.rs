// Service integration tests

mod actor_test;
