//! Integration Tests Module
//!
//! End-to-end tests for SOW Studio: pricing extraction over realistic
//! responses, the streaming generation state machine against scripted
//! transports, and the finance helpers.


// Extraction over full responses
mod extraction_test;

// Generation state machine tests
mod generation_test;

// Finance and discount tests
mod finance_test;
