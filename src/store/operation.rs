use std::fmt;

/// The four things the store can ask the remote API to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchAll,
    FetchOne,
    Create,
    Delete,
}

impl Operation {
    /// Fixed message shown to users when this operation fails.
    ///
    /// Carries no detail from the underlying failure.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::FetchAll => "There was an error fetching the cities...",
            Operation::FetchOne => "There was an error loading the city...",
            Operation::Create => "There was an error creating the city...",
            Operation::Delete => "There was an error deleting the city...",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::FetchAll => "fetch_all",
            Operation::FetchOne => "fetch_one",
            Operation::Create => "create",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
