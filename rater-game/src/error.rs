use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RaterError {
    #[error("malformed logic expression \"{expression}\": {reason}")]
    MalformedExpression { expression: String, reason: String },

    #[error("unable to compile logic for {name}")]
    InDefinition {
        name: String,
        #[source]
        source: Box<RaterError>,
    },

    #[error("difficulty must be non-negative: {context}")]
    NegativeTier { context: String },

    #[error("unknown goal {0}")]
    UnknownGoal(String),

    #[error("unknown location {0}")]
    UnknownLocation(String),

    #[error("invalid requirement {symbol} (in {})", .chain.join(" <- "))]
    InvalidRequirement { symbol: String, chain: Vec<String> },
}

impl RaterError {
    pub fn malformed(expression: &str, reason: &str) -> Self {
        RaterError::MalformedExpression {
            expression: expression.to_owned(),
            reason: reason.to_owned(),
        }
    }

    /// Records an enclosing macro or location on an `InvalidRequirement` as it
    /// propagates outward. Other errors pass through unchanged.
    pub fn within(self, name: &str) -> Self {
        match self {
            RaterError::InvalidRequirement { symbol, mut chain } => {
                chain.push(name.to_owned());
                RaterError::InvalidRequirement { symbol, chain }
            }
            e => e,
        }
    }
}

pub type Result<T> = std::result::Result<T, RaterError>;
