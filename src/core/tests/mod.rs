mod hazard_tests;
mod policy_engine_tests;
mod support;
