//! Storage backend tests.
//!
//! `contract` holds the behavior every backend must share; the other modules run it
//! against one backend each and add what only that backend can check.

mod file;
