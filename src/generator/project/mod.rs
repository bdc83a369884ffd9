mod generate;
mod styling;

pub use generate::{generate_project, GenerateOptions, GenerationRequest};
pub use styling::{
    ensure_tailwind_directives, StylingError, StylingStep, TailwindSetup, TAILWIND_DIRECTIVES,
    TAILWIND_PACKAGES,
};
