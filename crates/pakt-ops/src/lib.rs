pub mod ops_imports;
