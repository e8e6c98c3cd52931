pub mod indicator_trait;
