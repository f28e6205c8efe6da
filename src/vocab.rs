//! Vocabulary - class and property IRIs used by the builders
//!
//! Terms are grouped by namespace:
//! - `rdf` / `xsd`: W3C terms for typing, lists and literal datatypes
//! - `structure`: modules, functions, clauses, types, directives, macros
//! - `code` (core namespace): source locations, calls, control flow, expressions
//! - `otp`: GenServer, Supervisor, Agent, Task, Application, ETS
//!
//! The ontology files themselves live outside this crate; only the names are
//! mirrored here.

macro_rules! terms {
    ($ns:literal; $($name:ident => $local:literal),* $(,)?) => {
        /// Namespace prefix
        pub const NS: &str = $ns;
        $(pub const $name: &str = concat!($ns, $local);)*
    };
}

pub mod rdf {
    terms!("http://www.w3.org/1999/02/22-rdf-syntax-ns#";
        TYPE => "type",
        FIRST => "first",
        REST => "rest",
        NIL => "nil",
    );
}

pub mod xsd {
    terms!("http://www.w3.org/2001/XMLSchema#";
        STRING => "string",
        INTEGER => "integer",
        BOOLEAN => "boolean",
        DOUBLE => "double",
        DATE_TIME => "dateTime",
    );
}

pub mod structure {
    terms!("https://w3id.org/elixir-code/structure#";
        // Modules
        MODULE => "Module",
        NESTED_MODULE => "NestedModule",
        MODULE_NAME => "moduleName",
        MODULEDOC => "moduledoc",
        DOCSTRING => "docstring",
        IS_DOC_HIDDEN => "isDocHidden",
        PARENT_MODULE => "parentModule",
        HAS_NESTED_MODULE => "hasNestedModule",

        // Functions
        FUNCTION => "Function",
        PUBLIC_FUNCTION => "PublicFunction",
        PRIVATE_FUNCTION => "PrivateFunction",
        GUARD_FUNCTION => "GuardFunction",
        DELEGATED_FUNCTION => "DelegatedFunction",
        PUBLIC_MACRO => "PublicMacro",
        PRIVATE_MACRO => "PrivateMacro",
        FUNCTION_NAME => "functionName",
        ARITY => "arity",
        MIN_ARITY => "minArity",
        BELONGS_TO => "belongsTo",
        CONTAINS_FUNCTION => "containsFunction",
        CONTAINS_MACRO => "containsMacro",
        DELEGATES_TO => "delegatesTo",
        IS_CALLBACK_IMPLEMENTATION => "isCallbackImplementation",
        IMPLEMENTS_CALLBACK => "implementsCallback",

        // Clauses and parameters
        FUNCTION_CLAUSE => "FunctionClause",
        HAS_CLAUSE => "hasClause",
        CLAUSE_OF => "clauseOf",
        HAS_CLAUSES => "hasClauses",
        CLAUSE_ORDER => "clauseOrder",
        IS_BODYLESS => "isBodyless",
        HAS_GUARD => "hasGuard",
        GUARD_EXPRESSION => "guardExpression",
        PARAMETER => "Parameter",
        DEFAULT_PARAMETER => "DefaultParameter",
        PATTERN_PARAMETER => "PatternParameter",
        HAS_PARAMETER => "hasParameter",
        PARAMETER_OF => "parameterOf",
        HAS_PARAMETERS => "hasParameters",
        PARAMETER_POSITION => "parameterPosition",
        PARAMETER_NAME => "parameterName",
        DEFAULT_VALUE => "defaultValue",
        PATTERN_TEXT => "patternText",

        // Anonymous functions
        ANONYMOUS_FUNCTION => "AnonymousFunction",
        HAS_ANONYMOUS_FUNCTION => "hasAnonymousFunction",
        ANONYMOUS_FUNCTION_OF => "anonymousFunctionOf",
        DEFINED_IN_CLAUSE => "definedInClause",
        CONTAINS_ANONYMOUS_FUNCTION => "containsAnonymousFunction",
        CLAUSE_COUNT => "clauseCount",
        HAS_CAPTURES => "hasCaptures",
        CAPTURES_VARIABLE => "capturesVariable",

        // Attributes
        MODULE_ATTRIBUTE => "ModuleAttribute",
        DOC_ATTRIBUTE => "DocAttribute",
        MODULEDOC_ATTRIBUTE => "ModuledocAttribute",
        TYPEDOC_ATTRIBUTE => "TypedocAttribute",
        BEHAVIOUR_ATTRIBUTE => "BehaviourAttribute",
        IMPL_ATTRIBUTE => "ImplAttribute",
        DERIVE_ATTRIBUTE => "DeriveAttribute",
        ENFORCE_KEYS_ATTRIBUTE => "EnforceKeysAttribute",
        COMPILE_ATTRIBUTE => "CompileAttribute",
        DEPRECATED_ATTRIBUTE => "DeprecatedAttribute",
        SINCE_ATTRIBUTE => "SinceAttribute",
        DIALYZER_ATTRIBUTE => "DialyzerAttribute",
        EXTERNAL_RESOURCE_ATTRIBUTE => "ExternalResourceAttribute",
        ATTRIBUTE_NAME => "attributeName",
        ATTRIBUTE_VALUE => "attributeValue",
        HAS_ATTRIBUTE => "hasAttribute",
        ATTRIBUTE_OF => "attributeOf",

        // Directives
        MODULE_ALIAS => "ModuleAlias",
        IMPORT => "Import",
        REQUIRE => "Require",
        USE => "Use",
        HAS_DIRECTIVE => "hasDirective",
        DIRECTIVE_OF => "directiveOf",
        DIRECTIVE_TARGET => "directiveTarget",
        SOURCE_MODULE_NAME => "sourceModuleName",
        ALIAS_NAME => "aliasName",
        IS_EXPLICIT_ALIAS => "isExplicitAlias",
        IMPORTS_FUNCTION => "importsFunction",
        EXCLUDES_FUNCTION => "excludesFunction",
        IMPORT_CATEGORY => "importCategory",
        USE_OPTION => "useOption",
        LEXICAL_SCOPE => "lexicalScope",
        IS_MULTI_TARGET => "isMultiTarget",
        DIRECTIVE_ORDER => "directiveOrder",

        // Types and specs
        PUBLIC_TYPE => "PublicType",
        PRIVATE_TYPE => "PrivateType",
        OPAQUE_TYPE => "OpaqueType",
        TYPE_NAME => "typeName",
        TYPE_PARAMETER => "typeParameter",
        TYPE_EXPRESSION => "typeExpression",
        HAS_TYPE => "hasType",
        TYPE_OF => "typeOf",
        FUNCTION_SPEC => "FunctionSpec",
        HAS_SPEC => "hasSpec",
        SPEC_FOR => "specFor",
        HAS_PARAMETER_TYPES => "hasParameterTypes",
        RETURN_TYPE => "returnType",
        DECLARED_IN => "declaredIn",

        // Structs and exceptions
        STRUCT => "Struct",
        STRUCT_FIELD => "StructField",
        EXCEPTION => "Exception",
        HAS_FIELD => "hasField",
        FIELD_OF => "fieldOf",
        FIELD_NAME => "fieldName",
        IS_ENFORCED => "isEnforced",
        DERIVES_PROTOCOL => "derivesProtocol",
        HAS_CUSTOM_MESSAGE => "hasCustomMessage",
        DEFAULT_MESSAGE => "defaultMessage",

        // Behaviours
        BEHAVIOUR => "Behaviour",
        CALLBACK_SPEC => "CallbackSpec",
        MACRO_CALLBACK_SPEC => "MacroCallbackSpec",
        OPTIONAL_CALLBACK => "OptionalCallback",
        DEFINES_CALLBACK => "definesCallback",
        CALLBACK_OF => "callbackOf",
        IMPLEMENTS_BEHAVIOUR => "implementsBehaviour",
        CALLBACK_SIGNATURE => "callbackSignature",

        // Protocols
        PROTOCOL => "Protocol",
        PROTOCOL_FUNCTION => "ProtocolFunction",
        PROTOCOL_IMPLEMENTATION => "ProtocolImplementation",
        DEFINES_PROTOCOL_FUNCTION => "definesProtocolFunction",
        FALLBACK_TO_ANY => "fallbackToAny",
        IMPLEMENTS_PROTOCOL => "implementsProtocol",
        HAS_IMPLEMENTATION => "hasImplementation",
        FOR_DATA_TYPE => "forDataType",
        FOR_MODULE => "forModule",
        IMPLEMENTATION_FUNCTION => "implementationFunction",
        DEFINED_IN_MODULE => "definedInModule",

        // Metaprogramming
        QUOTED_EXPRESSION => "QuotedExpression",
        UNQUOTE_EXPRESSION => "UnquoteExpression",
        HYGIENE_VIOLATION => "HygieneViolation",
        CONTAINS_QUOTE => "containsQuote",
        QUOTED_IN => "quotedIn",
        HAS_UNQUOTE => "hasUnquote",
        UNQUOTE_OF => "unquoteOf",
        IS_SPLICING => "isSplicing",
        HAS_HYGIENE_VIOLATION => "hasHygieneViolation",
        HYGIENE_VIOLATION_OF => "hygieneViolationOf",
        VIOLATION_TYPE => "violationType",
        VARIABLE_NAME => "variableName",
        BIND_QUOTED_VARIABLE => "bindQuotedVariable",
        KEEPS_LOCATION => "keepsLocation",
        QUOTE_CONTEXT => "quoteContext",
        UNQUOTE_COUNT => "unquoteCount",
    );
}

pub mod code {
    terms!("https://w3id.org/elixir-code/core#";
        // Source
        SOURCE_FILE => "SourceFile",
        SOURCE_LOCATION => "SourceLocation",
        HAS_SOURCE_LOCATION => "hasSourceLocation",
        IN_SOURCE_FILE => "inSourceFile",
        DEFINED_IN_FILE => "definedInFile",
        START_LINE => "startLine",
        END_LINE => "endLine",
        FILE_PATH => "filePath",
        ANALYZED_AT => "analyzedAt",

        // Calls
        LOCAL_CALL => "LocalCall",
        REMOTE_CALL => "RemoteCall",
        DYNAMIC_CALL => "DynamicCall",
        CONTAINS_CALL => "containsCall",
        CALLER => "caller",
        CALLS_FUNCTION => "callsFunction",
        CALLED_MODULE => "calledModule",
        CALL_NAME => "callName",
        CALL_ARITY => "callArity",
        IS_EXTERNAL => "isExternal",
        RECEIVER_TEXT => "receiverText",

        // Control flow
        IF_EXPRESSION => "IfExpression",
        UNLESS_EXPRESSION => "UnlessExpression",
        CASE_EXPRESSION => "CaseExpression",
        COND_EXPRESSION => "CondExpression",
        WITH_EXPRESSION => "WithExpression",
        FOR_COMPREHENSION => "ForComprehension",
        TRY_EXPRESSION => "TryExpression",
        RECEIVE_EXPRESSION => "ReceiveExpression",
        CONTAINS_CONTROL_FLOW => "containsControlFlow",
        CONTROL_FLOW_OF => "controlFlowOf",
        BRANCH_COUNT => "branchCount",
        HAS_ELSE => "hasElse",
        HAS_RESCUE => "hasRescue",
        HAS_CATCH => "hasCatch",
        HAS_AFTER => "hasAfter",
        NESTING_DEPTH => "nestingDepth",

        // Expressions
        EXPRESSION => "Expression",
        HAS_CONDITION => "hasCondition",
        CONDITION_OF => "conditionOf",
        EXPRESSION_TEXT => "expressionText",
        EXPRESSION_KIND => "expressionKind",
    );
}

pub mod otp {
    terms!("https://w3id.org/elixir-code/otp#";
        GEN_SERVER => "GenServerImplementation",
        SUPERVISOR => "SupervisorImplementation",
        DYNAMIC_SUPERVISOR => "DynamicSupervisorImplementation",
        AGENT => "AgentImplementation",
        TASK => "TaskImplementation",
        APPLICATION => "ApplicationImplementation",
        ETS_TABLE => "ETSTable",
        CHILD_SPEC => "ChildSpec",
        IMPLEMENTS_OTP_PATTERN => "implementsOTPPattern",
        PATTERN_OF => "patternOf",
        IMPLEMENTS_OTP_CALLBACK => "implementsOTPCallback",
        SUPERVISION_STRATEGY => "supervisionStrategy",
        HAS_CHILD => "hasChild",
        CHILD_OF => "childOf",
        CHILD_MODULE => "childModule",
        CHILD_ORDER => "childOrder",
        CHILD_SPEC_TEXT => "childSpecText",
        TABLE_NAME => "tableName",
        TABLE_TYPE => "tableType",
        TABLE_ACCESS => "tableAccess",
        IS_NAMED_TABLE => "isNamedTable",
        OWNS_TABLE => "ownsTable",
        OWNED_BY => "ownedBy",
        CREATED_IN => "createdIn",
        USE_OPTION => "useOption",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_share_namespace() {
        assert!(structure::MODULE.starts_with(structure::NS));
        assert!(code::SOURCE_LOCATION.starts_with(code::NS));
        assert!(otp::GEN_SERVER.starts_with(otp::NS));
        assert_eq!(rdf::TYPE, "http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
    }

    #[test]
    fn test_function_classes_are_distinct() {
        let classes = [
            structure::PUBLIC_FUNCTION,
            structure::PRIVATE_FUNCTION,
            structure::GUARD_FUNCTION,
            structure::DELEGATED_FUNCTION,
            structure::PUBLIC_MACRO,
            structure::PRIVATE_MACRO,
        ];
        let unique: std::collections::HashSet<_> = classes.iter().collect();
        assert_eq!(unique.len(), classes.len());
    }
}
