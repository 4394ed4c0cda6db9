use rs_script::engine::{RunOptions, ScriptEngine};
use rs_script::host::HostContext;
use rs_script::safety::SafetyLimits;

const SOURCE: &str = r#"
def fib($n) {
    if $n < 2 then { return $n }
    set $a = $n - 1
    set $b = $n - 2
    set $ra = call fib $a
    set $rb = call fib $b
    return $ra + $rb
}
print call fib 10
"#;

#[test]
fn recursive_function_calls_accumulate_across_the_call_stack() {
    let mut engine = ScriptEngine::initialize(HostContext::new(), SafetyLimits::default());
    let outcome = engine.run(SOURCE, RunOptions::default()).unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.output, vec!["55".to_owned()]);
}
