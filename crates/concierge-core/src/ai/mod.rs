pub mod openrouter;
pub mod proxy;

pub use openrouter::OpenRouterClient;
pub use proxy::ProxyClient;
