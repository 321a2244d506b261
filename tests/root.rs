// All files containing tests
mod common;
