// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod browser;
pub mod error;
pub mod forms;
pub mod history;
pub mod ids;
pub mod model;
pub mod pagination;
pub mod pricing;
pub mod slots;
pub mod state;

pub use browser::*;
pub use error::*;
pub use forms::*;
pub use history::*;
pub use ids::*;
pub use model::*;
pub use pagination::*;
pub use pricing::*;
pub use slots::*;
pub use state::*;
