//! The external collaborators the core pipeline hands finished
//! [`goatcore::CommandMetadata`] to: a help-message
//! formatter, an entry-point code generator, a file rewriter that
//! splices generated code over a located entry point, and a project
//! scaffold for `init`. None of these interpret or re-derive metadata;
//! they only render it.

pub mod codegen;
pub mod help;
pub mod rewriter;
pub mod scaffold;

pub use codegen::generate_entry_point;
pub use help::format_help;
pub use rewriter::{rewrite_entry_point, RewriteError};
pub use scaffold::scaffold_project;
