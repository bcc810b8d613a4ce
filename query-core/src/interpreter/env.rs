use crate::interpreter::InterpreterError;
use query_value::QueryValue;

/// The variable environment threaded through evaluation. Persistent so that
/// sibling scopes can extend it independently without copying the bindings
/// of the enclosing scope.
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: im::HashMap<String, QueryValue>,
}

impl Env {
    pub fn get(&self, name: &str) -> Result<&QueryValue, InterpreterError> {
        self.vars
            .get(name)
            .ok_or_else(|| InterpreterError::UnboundVariable(name.to_owned()))
    }

    pub fn insert(&mut self, name: String, value: QueryValue) {
        self.vars.insert(name, value);
    }

    /// A copy of this environment with one extra binding.
    pub fn bound(&self, name: String, value: QueryValue) -> Env {
        let mut next = self.clone();
        next.insert(name, value);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_does_not_mutate_the_original() {
        let base = Env::default();
        let extended = base.bound("x".to_owned(), QueryValue::from(1));

        assert!(base.get("x").is_err());
        assert_eq!(extended.get("x").unwrap(), &QueryValue::Int(1));
    }
}
