use query_value::QueryValue;

pub type SelectionArgument = (String, QueryValue);

/// One requested output field: a schema field name, an optional alias for
/// the output property, arguments, and the nested selection for object- or
/// list-typed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    name: String,
    alias: Option<String>,
    arguments: Vec<SelectionArgument>,
    nested_selections: Vec<Selection>,
}

impl Selection {
    pub fn with_name(name: impl Into<String>) -> Selection {
        Selection::new(name, None, Vec::new(), Vec::new())
    }

    pub fn new<T, A, N>(name: T, alias: Option<String>, arguments: A, nested_selections: N) -> Selection
    where
        T: Into<String>,
        A: Into<Vec<SelectionArgument>>,
        N: Into<Vec<Selection>>,
    {
        Selection {
            name: name.into(),
            alias,
            arguments: arguments.into(),
            nested_selections: nested_selections.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn set_alias(&mut self, alias: Option<String>) {
        self.alias = alias;
    }

    /// The property name this entry produces in the result: the alias if
    /// present, the field name otherwise.
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn arguments(&self) -> &[SelectionArgument] {
        &self.arguments
    }

    pub fn push_argument(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.arguments.push((key.into(), value.into()));
    }

    pub fn nested_selections(&self) -> &[Selection] {
        &self.nested_selections
    }

    pub fn push_nested_selection(&mut self, selection: Selection) {
        self.nested_selections.push(selection);
    }

    pub fn set_nested_selections(&mut self, selections: Vec<Selection>) {
        self.nested_selections = selections;
    }
}

/// One incoming operation: reads compile against the query root, writes
/// against the mutation root.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Read(Vec<Selection>),
    Write(Vec<Selection>),
}

impl Operation {
    pub fn selections(&self) -> &[Selection] {
        match self {
            Operation::Read(selections) | Operation::Write(selections) => selections,
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Operation::Write(_))
    }
}
