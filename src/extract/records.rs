//! Structured records consumed by the entity builders
//!
//! One [`ModuleAnalysis`] per module; every other record hangs off it. All
//! module references are already resolved through the module's aliases.

use crate::ast::{BlockKind, DefKind, SourceLocation};
use crate::closure::ClosureAnalysis;
use crate::scope::directive::UseOption;
use crate::scope::{Directive, ModulePath, SkippedNode};
use serde::Serialize;
use std::fmt;

/// `name/arity`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FunctionKey {
    pub name: String,
    pub arity: usize,
}

impl FunctionKey {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// `@doc`/`@moduledoc` value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Doc {
    Text(String),
    /// `@doc false`
    Hidden,
}

/// How a module came to be defined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModuleKind {
    Module,
    Protocol,
    Implementation,
}

/// Everything extracted from one module definition
#[derive(Debug, Clone, Serialize)]
pub struct ModuleAnalysis {
    pub name: ModulePath,
    pub kind: ModuleKind,
    pub parent: Option<ModulePath>,
    pub nested: Vec<ModulePath>,
    pub location: Option<SourceLocation>,
    pub moduledoc: Option<Doc>,
    pub directives: Vec<Directive>,
    pub skipped_directives: Vec<SkippedNode>,
    pub attributes: Vec<AttributeRecord>,
    pub functions: Vec<FunctionRecord>,
    pub types: Vec<TypeRecord>,
    pub specs: Vec<SpecRecord>,
    pub callbacks: Vec<CallbackRecord>,
    /// `@behaviour X` targets
    pub behaviours: Vec<ModulePath>,
    pub struct_def: Option<StructRecord>,
    pub protocol: Option<ProtocolRecord>,
    pub implementation: Option<ImplRecord>,
    pub otp: OtpRecord,
    pub calls: Vec<CallRecord>,
    pub control_flow: Vec<ControlFlowRecord>,
    pub closures: Vec<ClosureRecord>,
    pub quotes: Vec<QuoteRecord>,
}

impl ModuleAnalysis {
    pub fn new(name: ModulePath, kind: ModuleKind) -> Self {
        Self {
            name,
            kind,
            parent: None,
            nested: Vec::new(),
            location: None,
            moduledoc: None,
            directives: Vec::new(),
            skipped_directives: Vec::new(),
            attributes: Vec::new(),
            functions: Vec::new(),
            types: Vec::new(),
            specs: Vec::new(),
            callbacks: Vec::new(),
            behaviours: Vec::new(),
            struct_def: None,
            protocol: None,
            implementation: None,
            otp: OtpRecord::default(),
            calls: Vec::new(),
            control_flow: Vec::new(),
            closures: Vec::new(),
            quotes: Vec::new(),
        }
    }

    pub fn function(&self, key: &FunctionKey) -> Option<&FunctionRecord> {
        self.functions.iter().find(|f| &f.key == key)
    }

    pub fn defines(&self, name: &str, arity: usize) -> bool {
        self.functions
            .iter()
            .any(|f| f.key.name == name && f.key.arity == arity)
    }
}

/// `@name value` at module level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeRecord {
    pub name: String,
    pub value: Option<String>,
    /// Occurrence index among attributes of the same name
    pub index: usize,
    pub location: Option<SourceLocation>,
}

/// `@impl` value attached to a function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ImplMarker {
    /// `@impl true`
    Any,
    /// `@impl SomeBehaviour`
    Behaviour(ModulePath),
}

/// `defdelegate ..., to: Module, as: :name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelegateTarget {
    pub module: ModulePath,
    pub function: String,
}

/// A named function, macro or guard with all of its clauses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionRecord {
    pub key: FunctionKey,
    #[serde(serialize_with = "serialize_def_kind")]
    pub kind: DefKind,
    /// Arity when every default argument is omitted
    pub min_arity: usize,
    pub doc: Option<Doc>,
    pub impl_marker: Option<ImplMarker>,
    pub delegate: Option<DelegateTarget>,
    pub clauses: Vec<ClauseRecord>,
    pub location: Option<SourceLocation>,
}

fn serialize_def_kind<S: serde::Serializer>(kind: &DefKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(kind.as_str())
}

/// One clause of a named function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClauseRecord {
    pub params: Vec<ParamRecord>,
    /// Guard source text
    pub guard: Option<String>,
    /// Head without a body (protocol functions, default-argument heads)
    pub bodyless: bool,
    pub location: Option<SourceLocation>,
}

/// One parameter of a clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamRecord {
    /// Variable name, when the parameter binds a single name
    pub name: Option<String>,
    /// Source text of the pattern
    pub text: String,
    pub default: Option<String>,
    /// Destructuring or literal pattern rather than a plain variable
    pub is_pattern: bool,
}

/// `@type`, `@typep`, `@opaque`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeVisibility {
    Public,
    Private,
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRecord {
    pub name: String,
    pub params: Vec<String>,
    pub visibility: TypeVisibility,
    pub definition: String,
    pub location: Option<SourceLocation>,
}

impl TypeRecord {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// `@spec name(args) :: return`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecRecord {
    pub key: FunctionKey,
    pub param_types: Vec<String>,
    pub return_type: String,
    /// Occurrence index among specs for the same `name/arity`
    pub index: usize,
    pub location: Option<SourceLocation>,
}

/// `@callback` / `@macrocallback`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallbackRecord {
    pub key: FunctionKey,
    pub is_macro: bool,
    /// Listed in `@optional_callbacks`
    pub optional: bool,
    pub signature: String,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRecord {
    pub name: String,
    pub default: Option<String>,
    pub enforced: bool,
}

/// `defstruct` or `defexception`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructRecord {
    pub fields: Vec<FieldRecord>,
    /// Protocols from `@derive`
    pub derives: Vec<ModulePath>,
    pub exception: bool,
    /// Module defines `message/1`
    pub custom_message: bool,
    pub default_message: Option<String>,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolRecord {
    pub functions: Vec<ProtocolFunctionRecord>,
    pub fallback_to_any: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolFunctionRecord {
    pub key: FunctionKey,
    pub doc: Option<Doc>,
    pub location: Option<SourceLocation>,
}

/// `defimpl Protocol, for: Type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImplRecord {
    pub protocol: ModulePath,
    pub for_type: ModulePath,
}

/// OTP patterns recognised from `use`/`@behaviour`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OtpKind {
    GenServer,
    Supervisor,
    DynamicSupervisor,
    Agent,
    Task,
    Application,
}

impl OtpKind {
    pub fn from_module(module: &str) -> Option<Self> {
        match module {
            "GenServer" => Some(OtpKind::GenServer),
            "Supervisor" => Some(OtpKind::Supervisor),
            "DynamicSupervisor" => Some(OtpKind::DynamicSupervisor),
            "Agent" => Some(OtpKind::Agent),
            "Task" => Some(OtpKind::Task),
            "Application" => Some(OtpKind::Application),
            _ => None,
        }
    }

    /// IRI segment
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpKind::GenServer => "genserver",
            OtpKind::Supervisor => "supervisor",
            OtpKind::DynamicSupervisor => "dynamic_supervisor",
            OtpKind::Agent => "agent",
            OtpKind::Task => "task",
            OtpKind::Application => "application",
        }
    }

    /// Callbacks the pattern's behaviour defines
    pub fn callbacks(&self) -> &'static [(&'static str, usize)] {
        match self {
            OtpKind::GenServer => &[
                ("init", 1),
                ("handle_call", 3),
                ("handle_cast", 2),
                ("handle_info", 2),
                ("handle_continue", 2),
                ("terminate", 2),
                ("code_change", 3),
                ("format_status", 1),
                ("format_status", 2),
            ],
            OtpKind::Supervisor | OtpKind::DynamicSupervisor => &[("init", 1)],
            OtpKind::Application => &[
                ("start", 2),
                ("stop", 1),
                ("prep_stop", 1),
                ("config_change", 3),
                ("start_phase", 3),
            ],
            OtpKind::Agent | OtpKind::Task => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpPatternRecord {
    pub kind: OtpKind,
    pub use_options: Vec<UseOption>,
    /// Module functions that implement the pattern's callbacks
    pub callbacks: Vec<FunctionKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildSpecRecord {
    pub module: Option<ModulePath>,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupervisorRecord {
    pub strategy: Option<String>,
    pub children: Vec<ChildSpecRecord>,
}

/// `:ets.new(name, options)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EtsTableRecord {
    pub name: String,
    pub table_type: String,
    pub access: String,
    pub named: bool,
    pub owner: FunctionKey,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OtpRecord {
    pub patterns: Vec<OtpPatternRecord>,
    pub supervisor: Option<SupervisorRecord>,
    pub ets_tables: Vec<EtsTableRecord>,
}

impl OtpRecord {
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.supervisor.is_none() && self.ets_tables.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CallKind {
    Local,
    Remote,
    Dynamic,
}

/// A call site inside a function body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    pub owner: FunctionKey,
    pub kind: CallKind,
    /// Callee module: resolved for remote calls, own or importing module for
    /// local ones
    pub module: Option<ModulePath>,
    pub name: Option<String>,
    pub arity: usize,
    /// Source text of the receiver for dynamic calls
    pub receiver: Option<String>,
    pub location: Option<SourceLocation>,
}

/// Condition or subject of a control-flow construct
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpressionRecord {
    pub text: String,
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlFlowRecord {
    pub owner: FunctionKey,
    #[serde(serialize_with = "serialize_block_kind")]
    pub kind: BlockKind,
    pub branch_count: usize,
    pub has_else: bool,
    pub has_rescue: bool,
    pub has_catch: bool,
    pub has_after: bool,
    /// 1 for a construct directly in a function body
    pub nesting_depth: usize,
    pub condition: Option<ExpressionRecord>,
    pub location: Option<SourceLocation>,
}

fn serialize_block_kind<S: serde::Serializer>(kind: &BlockKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(kind.as_str())
}

/// An `fn` inside a function body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosureRecord {
    pub owner: FunctionKey,
    /// Index of the enclosing clause of the owner
    pub clause_index: usize,
    pub arity: usize,
    pub clause_count: usize,
    pub analysis: ClosureAnalysis,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnquoteRecord {
    pub splicing: bool,
    pub text: String,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HygieneKind {
    /// `var!/1,2`
    Var,
    /// `alias!/1`
    Alias,
}

impl HygieneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HygieneKind::Var => "var!",
            HygieneKind::Alias => "alias!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HygieneRecord {
    pub kind: HygieneKind,
    pub name: String,
    pub location: Option<SourceLocation>,
}

/// A `quote` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteRecord {
    pub owner: FunctionKey,
    pub bind_quoted: Vec<String>,
    /// `location: :keep`
    pub keeps_location: bool,
    pub context: Option<String>,
    pub unquotes: Vec<UnquoteRecord>,
    pub hygiene: Vec<HygieneRecord>,
    pub location: Option<SourceLocation>,
}
