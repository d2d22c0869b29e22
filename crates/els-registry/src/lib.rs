//! Registry of template-addressable entities and the reverse usage index.
//!
//! [`RegistryStore`] is an owned value: each language server instance (and each
//! test) creates its own and hands it to the project manager.

mod registry;
mod store;
mod tokens;
mod usages;

pub use registry::Registry;
pub use store::RegistryStore;
pub use tokens::{template_arguments, template_blocks, HandlebarsTokenizer, TemplateTokenizer};
pub use usages::{TemplateTokenMeta, Usage, UsageIndex};
