pub mod points_table;
