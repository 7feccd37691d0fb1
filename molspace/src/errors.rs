#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// Got a matrix or vector with the wrong number of entries
    Shape(String),
    /// Got a cell matrix which is singular or has a negative determinant
    Invertibility(String),
    /// Got a value outside of the domain of a function (negative lengths,
    /// invalid angles, rotated cells, ...)
    Domain(String),
    /// The requested operation is not possible in the current state of the
    /// object (setting angles on an infinite cell, querying a neighbor list
    /// before building it, ...)
    State(String),
    /// A neighbor search can not be set up with the given parameters, for
    /// example a cutoff radius which is not positive
    NotFound(String),
    /// Error while serializing/deserializing data
    Json(serde_json::Error),
    /// Error coming from chemfiles when converting unit cells
    Chemfiles(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Shape(e) => write!(f, "shape error: {}", e),
            Error::Invertibility(e) => write!(f, "invertibility error: {}", e),
            Error::Domain(e) => write!(f, "domain error: {}", e),
            Error::State(e) => write!(f, "state error: {}", e),
            Error::NotFound(e) => write!(f, "not found error: {}", e),
            Error::Json(e) => write!(f, "json error: {}", e),
            Error::Chemfiles(e) => write!(f, "chemfiles error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Shape(_) |
            Error::Invertibility(_) |
            Error::Domain(_) |
            Error::State(_) |
            Error::NotFound(_) |
            Error::Chemfiles(_) => None,
            Error::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Error {
        Error::Json(error)
    }
}
