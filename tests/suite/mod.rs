mod diagnostics_tests;
mod optimization_tests;
mod parser_tests;
mod pattern_tests;
mod property_tests;
