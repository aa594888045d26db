//! In-memory coverage tree.
//!
//! Modules, classes and methods live in flat arenas owned by
//! [`CoverageTree`] and are addressed by typed keys. Parents hold ordered
//! key lists of their children plus a name index, so ownership only
//! runs downward and there are no back references.

use std::collections::HashMap;

/// Index of a module in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleKey(pub(crate) usize);

/// Index of a class in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassKey(pub(crate) usize);

/// Index of a method in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodKey(pub(crate) usize);

/// Rollup statistics attached to every level of the tree
///
/// Only the summary pass writes these; a freshly built tree carries zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub num_sequence_points: u64,
    pub visited_sequence_points: u64,

    /// 100 × visited / total, or 0 when there are no points
    pub sequence_coverage: f64,

    pub num_methods: u64,
    pub visited_methods: u64,
    pub num_classes: u64,
    pub visited_classes: u64,
}

/// A visited source location inside a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePoint {
    pub visit_count: u64,

    /// Unique across the whole conversion run
    pub uspid: u64,

    /// Position within the owning method, from 0
    pub ordinal: u64,

    pub offset: u64,
    pub start_line: u64,
    pub start_column: u64,

    // The trace carries a single point, so end == start
    pub end_line: u64,
    pub end_column: u64,
}

/// Branch coverage placeholder; never populated from traces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPoint {
    pub visit_count: u64,
    pub ordinal: u64,
    pub offset: u64,
    pub path: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub token: u64,

    /// File id into the owning module's file table
    pub file_ref: u32,

    /// Runtime id from the trace
    pub method_id: u64,

    pub sequence_points: Vec<SequencePoint>,
    pub branch_points: Vec<BranchPoint>,
    pub summary: Summary,
}

impl Method {
    pub fn new(name: String, token: u64, file_ref: u32, method_id: u64) -> Self {
        Self {
            name,
            token,
            file_ref,
            method_id,
            sequence_points: Vec::new(),
            branch_points: Vec::new(),
            summary: Summary::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: String,
    pub methods: Vec<MethodKey>,
    pub summary: Summary,
    method_index: HashMap<String, MethodKey>,
}

impl Class {
    pub fn new(name: String) -> Self {
        Self {
            name,
            methods: Vec::new(),
            summary: Summary::default(),
            method_index: HashMap::new(),
        }
    }

    pub fn method_key(&self, name: &str) -> Option<MethodKey> {
        self.method_index.get(name).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub filename: String,
    pub guid: String,

    /// Source file path -> file id
    pub files: HashMap<String, u32>,

    pub classes: Vec<ClassKey>,
    pub summary: Summary,
    class_index: HashMap<String, ClassKey>,
}

impl Module {
    pub fn new(name: String, filename: String, guid: String) -> Self {
        Self {
            name,
            filename,
            guid,
            files: HashMap::new(),
            classes: Vec::new(),
            summary: Summary::default(),
            class_index: HashMap::new(),
        }
    }

    pub fn class_key(&self, name: &str) -> Option<ClassKey> {
        self.class_index.get(name).copied()
    }

    /// File table sorted by id, the order renderers emit it in
    pub fn files_by_id(&self) -> Vec<(u32, &str)> {
        let mut files: Vec<(u32, &str)> = self
            .files
            .iter()
            .map(|(path, id)| (*id, path.as_str()))
            .collect();
        files.sort_unstable_by_key(|(id, _)| *id);
        files
    }
}

/// The whole coverage tree for one conversion run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageTree {
    modules: Vec<Module>,
    classes: Vec<Class>,
    methods: Vec<Method>,
    module_index: HashMap<String, ModuleKey>,
    method_ids: HashMap<u64, MethodKey>,
}

impl CoverageTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a module, replacing any previous module with the same filename
    ///
    /// The replaced module keeps its position in iteration order.
    pub fn upsert_module(&mut self, module: Module) -> (ModuleKey, bool) {
        if let Some(&key) = self.module_index.get(&module.filename) {
            self.modules[key.0] = module;
            return (key, true);
        }

        let key = ModuleKey(self.modules.len());
        self.module_index.insert(module.filename.clone(), key);
        self.modules.push(module);
        (key, false)
    }

    /// Attach a new class to a module
    ///
    /// Callers check `Module::class_key` first; the name is assumed new.
    pub fn insert_class(&mut self, module: ModuleKey, class: Class) -> ClassKey {
        let key = ClassKey(self.classes.len());
        let owner = &mut self.modules[module.0];
        owner.class_index.insert(class.name.clone(), key);
        owner.classes.push(key);
        self.classes.push(class);
        key
    }

    /// Attach a new method to a class and index it by its runtime id
    ///
    /// Callers check `Class::method_key` and `method_by_id` first.
    pub fn insert_method(&mut self, class: ClassKey, method: Method) -> MethodKey {
        let key = MethodKey(self.methods.len());
        let owner = &mut self.classes[class.0];
        owner.method_index.insert(method.name.clone(), key);
        owner.methods.push(key);
        self.method_ids.insert(method.method_id, key);
        self.methods.push(method);
        key
    }

    pub fn module_key(&self, filename: &str) -> Option<ModuleKey> {
        self.module_index.get(filename).copied()
    }

    pub fn method_by_id(&self, method_id: u64) -> Option<MethodKey> {
        self.method_ids.get(&method_id).copied()
    }

    pub fn module(&self, key: ModuleKey) -> &Module {
        &self.modules[key.0]
    }

    pub fn module_mut(&mut self, key: ModuleKey) -> &mut Module {
        &mut self.modules[key.0]
    }

    pub fn class(&self, key: ClassKey) -> &Class {
        &self.classes[key.0]
    }

    pub fn class_mut(&mut self, key: ClassKey) -> &mut Class {
        &mut self.classes[key.0]
    }

    pub fn method(&self, key: MethodKey) -> &Method {
        &self.methods[key.0]
    }

    pub fn method_mut(&mut self, key: MethodKey) -> &mut Method {
        &mut self.methods[key.0]
    }

    /// Modules in first-seen order
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    pub fn module_keys(&self) -> impl Iterator<Item = ModuleKey> {
        (0..self.modules.len()).map(ModuleKey)
    }

    pub fn classes_of<'a>(&'a self, module: &'a Module) -> impl Iterator<Item = &'a Class> + 'a {
        module.classes.iter().map(move |key| self.class(*key))
    }

    pub fn methods_of<'a>(&'a self, class: &'a Class) -> impl Iterator<Item = &'a Method> + 'a {
        class.methods.iter().map(move |key| self.method(*key))
    }

    /// Look a method up by module filename, class name and method name
    pub fn find_method(&self, module: &str, class: &str, method: &str) -> Option<&Method> {
        let module = self.module(self.module_key(module)?);
        let class = self.class(module.class_key(class)?);
        class.method_key(method).map(|key| self.method(key))
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn sequence_point_count(&self) -> usize {
        self.methods.iter().map(|m| m.sequence_points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
