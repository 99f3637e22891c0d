pub mod jotti;
