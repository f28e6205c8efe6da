//! End-to-end scenarios: syntax tree in, graph out

use exgraph::ast::{Meta, SyntaxNode as N};
use exgraph::graph::list::read_list;
use exgraph::scope::{Scope, ScopeTracker};
use exgraph::vocab::{code, structure};
use exgraph::{BuildContext, Graph, Iri, Literal, Pipeline, PipelineOptions};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn module(segments: &[&str], body: Vec<N>) -> N {
    N::form(
        "defmodule",
        Meta::spanning(1, 30),
        vec![N::aliases(segments), N::do_keyword(N::block(body))],
    )
}

fn def(kind: &str, name: &str, params: Vec<N>, body: N) -> N {
    N::form(
        kind,
        Meta::spanning(3, 6),
        vec![N::call(name, params), N::do_keyword(body)],
    )
}

fn attr(name: &str, value: N) -> N {
    N::form("@", Meta::at(2), vec![N::call(name, vec![value])])
}

fn ctx() -> BuildContext {
    BuildContext::default().with_file_path("lib/app.ex")
}

fn build(root: &N) -> Graph {
    let result = Pipeline::default().run_source(root, &ctx()).unwrap();
    assert!(result.report.is_clean(), "{:?}", result.report.failures);
    result.graph
}

fn module_iri(name: &str) -> Iri {
    ctx().module_iri_for(name)
}

fn links_to(graph: &Graph, subject: &Iri, predicate: &str, object: &Iri) -> bool {
    graph
        .objects(subject, predicate)
        .any(|o| o.as_iri() == Some(object))
}

/// defmodule M do
///   def f(x), do: g()
///   defp g, do: M2.h()
/// end
#[test]
fn test_local_then_remote_call_chain() {
    let root = module(
        &["M"],
        vec![
            def("def", "f", vec![N::var("x")], N::call("g", vec![])),
            def("defp", "g", vec![], N::remote(N::aliases(&["M2"]), "h", vec![])),
        ],
    );
    let graph = build(&root);

    let m = module_iri("M");
    let f = Iri::for_function(&m, "f", 1);
    let g = Iri::for_function(&m, "g", 0);
    let h = Iri::for_function(&module_iri("M2"), "h", 0);

    assert!(graph.has_type(&f, structure::PUBLIC_FUNCTION));
    assert!(graph.has_type(&g, structure::PRIVATE_FUNCTION));
    assert!(links_to(&graph, &m, structure::CONTAINS_FUNCTION, &f));
    assert!(links_to(&graph, &g, structure::BELONGS_TO, &m));

    let local = Iri::for_anonymous(&f, "call", 0);
    let remote = Iri::for_anonymous(&g, "call", 1);
    assert!(graph.has_type(&local, code::LOCAL_CALL));
    assert!(links_to(&graph, &local, code::CALLS_FUNCTION, &g));
    assert!(graph.has_type(&remote, code::REMOTE_CALL));
    assert!(links_to(&graph, &remote, code::CALLS_FUNCTION, &h));
    assert!(links_to(&graph, &f, code::CONTAINS_CALL, &local));
}

/// defmodule M do
///   def f(x), do: g()
///   defdelegate g, to: M2, as: :h
/// end
#[test]
fn test_delegated_function_targets_other_module() {
    let root = module(
        &["M"],
        vec![
            def("def", "f", vec![N::var("x")], N::call("g", vec![])),
            N::form(
                "defdelegate",
                Meta::at(4),
                vec![
                    N::call("g", vec![]),
                    N::keyword(vec![("to", N::aliases(&["M2"])), ("as", N::atom("h"))]),
                ],
            ),
        ],
    );
    let graph = build(&root);

    let m = module_iri("M");
    let f = Iri::for_function(&m, "f", 1);
    let g = Iri::for_function(&m, "g", 0);
    let h = Iri::for_function(&module_iri("M2"), "h", 0);

    assert!(graph.has_type(&g, structure::DELEGATED_FUNCTION));
    assert!(links_to(&graph, &g, structure::BELONGS_TO, &m));
    assert!(links_to(&graph, &m, structure::CONTAINS_FUNCTION, &g));
    assert!(links_to(&graph, &g, structure::DELEGATES_TO, &h));
    assert!(!links_to(
        &graph,
        &g,
        structure::DELEGATES_TO,
        &Iri::for_function(&m, "h", 0)
    ));

    let call = Iri::for_anonymous(&f, "call", 0);
    assert!(links_to(&graph, &call, code::CALLS_FUNCTION, &g));
}

/// def f(c) do
///   X.g()
///   if c do alias A.B end
///   alias A.X
///   B.g()
///   X.g()
/// end
#[test]
fn test_call_targets_follow_alias_scope_and_order() {
    let alias = |segments: &[&str]| N::form("alias", Meta::at(4), vec![N::aliases(segments)]);
    let body = N::block(vec![
        N::remote(N::aliases(&["X"]), "g", vec![]),
        N::call("if", vec![N::var("c"), N::do_keyword(alias(&["A", "B"]))]),
        alias(&["A", "X"]),
        N::remote(N::aliases(&["B"]), "g", vec![]),
        N::remote(N::aliases(&["X"]), "g", vec![]),
    ]);
    let graph = build(&module(&["M"], vec![def("def", "f", vec![N::var("c")], body)]));

    let f = Iri::for_function(&module_iri("M"), "f", 1);
    let targets: Vec<Iri> = (0..3)
        .map(|n| {
            graph
                .objects(&Iri::for_anonymous(&f, "call", n), code::CALLS_FUNCTION)
                .find_map(|o| o.as_iri().cloned())
                .unwrap()
        })
        .collect();
    assert_eq!(
        targets,
        vec![
            Iri::for_function(&module_iri("X"), "g", 0),
            Iri::for_function(&module_iri("B"), "g", 0),
            Iri::for_function(&module_iri("A.X"), "g", 0),
        ]
    );
}

/// alias A.B.{C, D.{E}}
#[test]
fn test_nested_alias_group_expands_to_leaves() {
    let group = N::form(
        "alias",
        Meta::at(2),
        vec![N::remote(
            N::aliases(&["A", "B"]),
            "{}",
            vec![
                N::aliases(&["C"]),
                N::remote(N::aliases(&["D"]), "{}", vec![N::aliases(&["E"])]),
            ],
        )],
    );
    let graph = build(&module(&["M"], vec![group]));

    let m = module_iri("M");
    let expected = [("A.B.C", "C"), ("A.B.D.E", "E")];
    for (index, (source, short)) in expected.iter().enumerate() {
        let iri = Iri::for_directive(&m, "alias", index);
        assert!(graph.has_type(&iri, structure::MODULE_ALIAS));
        assert_eq!(
            graph.literal(&iri, structure::SOURCE_MODULE_NAME),
            Some(&Literal::string(*source))
        );
        assert_eq!(
            graph.literal(&iri, structure::ALIAS_NAME),
            Some(&Literal::string(*short))
        );
        assert_eq!(
            graph.literal(&iri, structure::IS_MULTI_TARGET),
            Some(&Literal::boolean(true))
        );
        assert!(links_to(&graph, &iri, structure::DIRECTIVE_TARGET, &module_iri(source)));
    }
    assert_eq!(graph.subjects_of_type(structure::MODULE_ALIAS).len(), 2);
}

#[test]
fn test_function_scope_alias_does_not_leak() {
    let alias = |segments: &[&str]| N::form("alias", Meta::at(4), vec![N::aliases(segments)]);
    let body = vec![
        alias(&["Top", "Level"]),
        def("def", "f", vec![], N::block(vec![alias(&["Inner", "Repo"]), N::var("x")])),
    ];

    let scopes: Vec<(String, Scope)> = ScopeTracker::new()
        .track(&body)
        .into_iter()
        .map(|d| (d.source.to_string(), d.scope))
        .collect();
    assert_eq!(
        scopes,
        vec![
            ("Top.Level".to_string(), Scope::Module),
            ("Inner.Repo".to_string(), Scope::Function),
        ]
    );

    let graph = build(&module(&["M"], body));
    let inner = Iri::for_directive(&module_iri("M"), "alias", 1);
    assert_eq!(
        graph.literal(&inner, structure::LEXICAL_SCOPE),
        Some(&Literal::string("function"))
    );
}

#[test]
fn test_identifiers_zero_based_ordinals_one_based() {
    let root = module(
        &["M"],
        vec![
            def("def", "f", vec![N::atom("a")], N::atom("ok")),
            def("def", "f", vec![N::var("x"), N::var("y")], N::atom("ok")),
            def("def", "f", vec![N::var("only")], N::var("only")),
        ],
    );
    let graph = build(&root);

    let f = Iri::for_function(&module_iri("M"), "f", 1);
    let second = Iri::for_clause(&f, 1);
    assert!(graph.has_type(&second, structure::FUNCTION_CLAUSE));
    assert_eq!(
        graph.literal(&second, structure::CLAUSE_ORDER),
        Some(&Literal::integer(2))
    );
    let param = Iri::for_parameter(&second, 0);
    assert_eq!(
        graph.literal(&param, structure::PARAMETER_POSITION),
        Some(&Literal::integer(1))
    );

    let head = graph
        .objects(&f, structure::HAS_CLAUSES)
        .next()
        .cloned()
        .unwrap();
    let clauses: Vec<_> = read_list(&graph, &head)
        .into_iter()
        .filter_map(|t| t.as_iri().cloned())
        .collect();
    assert_eq!(
        clauses,
        vec![Iri::for_clause(&f, 0), Iri::for_clause(&f, 1)]
    );
    assert!(graph.has_type(&Iri::for_function(&module_iri("M"), "f", 2), structure::PUBLIC_FUNCTION));
}

#[test]
fn test_rebuild_is_idempotent_and_identifiers_unique() {
    let root = N::block(vec![
        module(
            &["A"],
            vec![
                def("def", "run", vec![], N::call("helper", vec![])),
                def("defp", "helper", vec![], N::atom("ok")),
            ],
        ),
        module(&["B"], vec![def("def", "run", vec![], N::atom("ok"))]),
    ]);
    let first = build(&root);
    let second = build(&root);
    assert_eq!(first, second);

    let typed: Vec<&Iri> = first
        .iter()
        .filter(|t| t.predicate.as_str() == exgraph::vocab::rdf::TYPE)
        .map(|t| &t.subject)
        .collect();
    let a_run = Iri::for_function(&module_iri("A"), "run", 0);
    let b_run = Iri::for_function(&module_iri("B"), "run", 0);
    assert_ne!(a_run, b_run);
    assert!(typed.contains(&&a_run));
    assert!(typed.contains(&&b_run));

    let unique: HashSet<&Iri> = first
        .subjects_of_type(structure::FUNCTION_CLAUSE)
        .into_iter()
        .collect();
    assert_eq!(unique.len(), 3);
}

#[test]
fn test_optional_callback_only_adds_a_type() {
    let callback = |name: &str| {
        attr(
            "callback",
            N::call("::", vec![N::call(name, vec![N::call("term", vec![])]), N::atom("ok")]),
        )
    };
    let plain = build(&module(&["Plugin"], vec![callback("handle")]));
    let optional = build(&module(
        &["Plugin"],
        vec![
            callback("handle"),
            attr("optional_callbacks", N::keyword(vec![("handle", N::int(1))])),
        ],
    ));

    let iri = Iri::for_callback(&module_iri("Plugin"), "handle", 1);
    assert!(optional.has_type(&iri, structure::OPTIONAL_CALLBACK));
    let extra: Vec<_> = optional
        .iter()
        .filter(|t| !plain.contains(t) && t.subject == iri)
        .collect();
    assert_eq!(extra.len(), 1);
}

#[test]
fn test_struct_shares_module_identity() {
    let graph = build(&module(
        &["User"],
        vec![N::call(
            "defstruct",
            vec![N::list(vec![N::atom("name"), N::atom("email")])],
        )],
    ));
    let user = module_iri("User");
    assert!(graph.has_type(&user, structure::MODULE));
    assert!(graph.has_type(&user, structure::STRUCT));
    assert_eq!(graph.subjects_of_type(structure::STRUCT_FIELD).len(), 2);
    assert!(links_to(&graph, &Iri::for_field(&user, "email"), structure::FIELD_OF, &user));
}

#[test]
fn test_worker_count_does_not_change_output() {
    let root = module(
        &["Svc"],
        vec![
            def(
                "def",
                "run",
                vec![N::var("x")],
                N::block(vec![
                    N::call("if", vec![N::var("x"), N::do_keyword(N::call("a", vec![]))]),
                    N::call("fn", vec![N::call("->", vec![N::list(vec![]), N::var("x")])]),
                    N::call("b", vec![]),
                ]),
            ),
            def("defp", "a", vec![], N::atom("ok")),
            def("defp", "b", vec![], N::atom("ok")),
        ],
    );
    let ctx = ctx().with_deep_expressions(true);
    let run = |workers: usize| {
        Pipeline::new(PipelineOptions {
            max_workers: workers,
            ..Default::default()
        })
        .run_source(&root, &ctx)
        .unwrap()
    };
    let serial = run(1);
    for workers in [2, 4, 16] {
        let parallel = run(workers);
        assert_eq!(serial.graph, parallel.graph);
        assert_eq!(serial.context.counter(), parallel.context.counter());
    }
}
