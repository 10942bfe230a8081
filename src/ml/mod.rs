pub mod labeling;
