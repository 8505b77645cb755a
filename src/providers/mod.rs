pub mod alpha_vantage;
pub mod listings;
pub mod ollama;
pub mod util;
