//! 派生宏编译期测试

#[test]
fn ui_composition_macros() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/service_ok.rs");
    t.pass("tests/ui/module_ok.rs");
}
