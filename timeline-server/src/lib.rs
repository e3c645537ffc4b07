pub mod llm;
pub mod server;
pub mod storage;
