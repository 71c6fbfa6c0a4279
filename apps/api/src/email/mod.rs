// Email resolution: extraction heuristics, candidate model and the cross-source finder.
// Network access happens in `search`; nothing in here talks to an upstream directly.

pub mod candidate;
pub mod extract;
pub mod finder;
