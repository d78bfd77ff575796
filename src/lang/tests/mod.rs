mod lex_test;
mod operation_test;
mod type_test;
