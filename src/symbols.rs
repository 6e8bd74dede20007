use derive_more::Display;
use log::trace;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymType {
    Unlimited,
    Void,
    Int,
    Double,
    Char,
    String,
}

impl SymType {
    /// Number of stack slots a value of this type occupies.
    pub fn slots(self) -> i32 {
        match self {
            SymType::Double => 2,
            SymType::Void => 0,
            _ => 1,
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(self, SymType::Int | SymType::Char)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub is_function: bool,
    pub is_const: bool,
    pub ty: SymType,
    pub index: i32,
    /// Only meaningful for functions.
    pub param_count: i32,
    pub is_initialized: bool,
}

/// An ordered registry of variables, functions and literal constants.
///
/// Every lookup is a first-match scan in insertion order, which is what gives
/// earlier declarations precedence. Indices are handed out sequentially and
/// never reused; a `double` variable takes two consecutive entries sharing one
/// name, and the name resolves to the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    fn next_index(&self) -> i32 {
        self.symbols.len() as i32
    }

    fn find(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.symbols.iter_mut().find(|s| s.name == name)
    }

    fn push(&mut self, name: &str, is_function: bool, is_const: bool, ty: SymType) -> i32 {
        let index = self.next_index();
        trace!("symbol {} '{}' ({}) at {}", ty, name, if is_function { "fn" } else { "var" }, index);
        self.symbols.push(Symbol {
            name: name.to_owned(),
            is_function,
            is_const,
            ty,
            index,
            param_count: 0,
            is_initialized: false,
        });
        index
    }

    /// Returns the index the name is bound to.
    pub fn add_var(&mut self, name: &str, is_const: bool, ty: SymType) -> i32 {
        let index = self.push(name, false, is_const, ty);
        if ty == SymType::Double {
            self.push(name, false, is_const, ty);
        }
        index
    }

    pub fn add_func(&mut self, name: &str, ty: SymType) -> i32 {
        self.push(name, true, false, ty)
    }

    /// Registers a literal constant (a string, say) under its own text.
    pub fn add_constant(&mut self, text: &str, ty: SymType) -> i32 {
        self.push(text, false, true, ty)
    }

    pub fn set_param_num(&mut self, name: &str, param_count: i32) {
        if let Some(s) = self
            .symbols
            .iter_mut()
            .find(|s| s.is_function && s.name == name)
        {
            s.param_count = param_count;
        }
    }

    pub fn init_var(&mut self, name: &str) {
        if let Some(s) = self.find_mut(name) {
            s.is_initialized = true;
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn is_const(&self, name: &str) -> bool {
        self.find(name).map_or(false, |s| s.is_const)
    }

    /// Only the first entry with this name counts.
    pub fn is_function(&self, name: &str) -> bool {
        self.find(name).map_or(false, |s| s.is_function)
    }

    pub fn is_constant_existed(&self, ty: SymType, name: &str) -> bool {
        self.symbols.iter().any(|s| s.name == name && s.ty == ty)
    }

    pub fn is_main_existed(&self) -> bool {
        self.is_declared("main")
    }

    pub fn is_init(&self, name: &str) -> bool {
        self.find(name).map_or(false, |s| s.is_initialized)
    }

    pub fn get_type(&self, name: &str) -> Option<SymType> {
        self.find(name).map(|s| s.ty)
    }

    pub fn get_index(&self, name: &str) -> Option<i32> {
        self.find(name).map(|s| s.index)
    }

    pub fn get_param_num(&self, name: &str) -> Option<i32> {
        self.symbols
            .iter()
            .find(|s| s.is_function && s.name == name)
            .map(|s| s.param_count)
    }

    /// Position of the function among the declared functions, which is the
    /// operand `call` expects.
    pub fn get_func_order(&self, name: &str) -> Option<i32> {
        self.get_functions()
            .position(|s| s.name == name)
            .map(|order| order as i32)
    }

    /// Function entries only, in declaration order.
    pub fn get_functions(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.is_function)
    }

    pub fn get(&self, index: usize) -> Option<&Symbol> {
        self.symbols.get(index)
    }

    pub fn name_by_index(&self, index: usize) -> Option<&str> {
        self.get(index).map(|s| s.name.as_str())
    }
}

impl<'a> IntoIterator for &'a SymbolTable {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::iter::FromIterator<Symbol> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        SymbolTable {
            symbols: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SymType, SymbolTable};

    #[test]
    fn double_takes_two_consecutive_indices() {
        let mut tab = SymbolTable::new();
        assert_eq!(tab.add_var("a", false, SymType::Int), 0);
        assert_eq!(tab.add_var("d", false, SymType::Double), 1);
        assert_eq!(tab.add_var("b", true, SymType::Char), 3);
        assert_eq!(tab.len(), 4);
        assert_eq!(tab.get_index("d"), Some(1));
        assert_eq!(tab.get(2).map(|s| s.name.as_str()), Some("d"));
        assert_eq!(tab.get(2).map(|s| s.index), Some(2));
    }

    #[test]
    fn first_match_wins() {
        let mut tab = SymbolTable::new();
        tab.add_var("x", true, SymType::Int);
        tab.add_var("x", false, SymType::Double);
        assert!(tab.is_const("x"));
        assert_eq!(tab.get_type("x"), Some(SymType::Int));
        assert_eq!(tab.get_index("x"), Some(0));
        assert!(tab.is_constant_existed(SymType::Double, "x"));
        assert!(!tab.is_constant_existed(SymType::Char, "x"));
    }

    #[test]
    fn functions_keep_declaration_order() {
        let mut tab = SymbolTable::new();
        tab.add_func("f", SymType::Int);
        tab.add_constant("hello", SymType::String);
        tab.add_func("main", SymType::Void);
        tab.set_param_num("f", 2);

        let names = tab.get_functions().map(|s| s.name.clone()).collect::<Vec<_>>();
        assert_eq!(names, vec!["f".to_owned(), "main".to_owned()]);
        assert_eq!(tab.get_param_num("f"), Some(2));
        assert_eq!(tab.get_param_num("hello"), None);
        assert_eq!(tab.get_func_order("main"), Some(1));
        assert_eq!(tab.get_index("main"), Some(2));
        assert!(tab.is_main_existed());
        assert!(tab.is_function("f"));
        assert!(!tab.is_function("hello"));
    }

    #[test]
    fn initialisation_marks_first_entry() {
        let mut tab = SymbolTable::new();
        tab.add_var("v", false, SymType::Int);
        assert!(!tab.is_init("v"));
        tab.init_var("v");
        assert!(tab.is_init("v"));
        assert!(!tab.is_init("missing"));
        assert!(!tab.is_declared("missing"));
    }
}
