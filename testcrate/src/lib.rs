//! Integration and fuzz tests for `partint` live in `tests/`
