use tanf_calculator::Calculator;

/// Per-handler state shared by every service call.
pub struct CommandContext {
    pub calculator: Calculator,
    pub default_year: i32,
    pub simulator_url: String,
}

impl CommandContext {
    pub fn new(calculator: Calculator, default_year: i32, simulator_url: impl Into<String>) -> Self {
        Self {
            calculator,
            default_year,
            simulator_url: simulator_url.into(),
        }
    }
}
