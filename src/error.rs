/// Result alias for the engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by graph construction, partitions and the optimiser.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A parameter is outside the domain the quality function or routine supports.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// A vertex or community index is outside its valid range.
    #[error("{what} {index} out of range [0, {bound})")]
    OutOfRange {
        /// Kind of index ("vertex", "community", ...).
        what: &'static str,
        /// Offending index.
        index: usize,
        /// Exclusive upper bound.
        bound: usize,
    },

    /// Arithmetic produced (or would consume) a non-finite value.
    #[error("non-finite value {value} in {context}")]
    Numerical {
        /// Where the value was produced.
        context: &'static str,
        /// The offending value.
        value: f64,
    },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidParameter { name, message: message.into() }
    }

    /// Fail with `OutOfRange` unless `index < bound`.
    #[inline]
    pub(crate) fn check_range(what: &'static str, index: usize, bound: usize) -> Result<()> {
        if index < bound { Ok(()) } else { Err(Error::OutOfRange { what, index, bound }) }
    }

    /// Fail with `Numerical` unless `value` is finite; pass it through otherwise.
    #[inline]
    pub(crate) fn check_finite(context: &'static str, value: f64) -> Result<f64> {
        if value.is_finite() { Ok(value) } else { Err(Error::Numerical { context, value }) }
    }
}
