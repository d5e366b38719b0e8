//! End-to-end tests driving whole input lines through the interpreter,
//! plus the algebraic laws the value types promise.

use libra::{
    ast::Stmt,
    env::{Environment, Scope},
    eval::eval,
    parser::Parser,
    rational::Rational,
    value::Value,
    Error, Interpreter,
};
use pretty_assertions::assert_eq;

fn run(interp: &mut Interpreter, line: &str) -> String {
    match interp.execute(line) {
        Ok(Some(output)) => output,
        Ok(None) => String::new(),
        Err(e) => panic!("'{line}' failed: {e}"),
    }
}

fn run_one(line: &str) -> String {
    run(&mut Interpreter::new(), line)
}

#[test]
fn test_rational_arithmetic() {
    assert_eq!(run_one("2 + 3"), "5");
    assert_eq!(run_one("10 - 4"), "6");
    assert_eq!(run_one("3 * 4"), "12");
    assert_eq!(run_one("15 / 3"), "5");
    assert_eq!(run_one("7 / 2"), "7/2");
    assert_eq!(run_one("(2 + 3) * 4"), "20");
    assert_eq!(run_one("2 + 3 * 4"), "14");
    assert_eq!(run_one("7 % 3"), "1");
    assert_eq!(run_one("2 ** 10"), "1024");
    assert_eq!(run_one("2 ^ -2"), "1/4");
    assert_eq!(run_one("0.5 + 0.25"), "3/4");
}

#[test]
fn test_complex_arithmetic() {
    assert_eq!(run_one("i"), "i");
    assert_eq!(run_one("2 + 3 * i"), "2 + 3i");
    assert_eq!(run_one("5 * i"), "5i");
    assert_eq!(run_one("(2 + 3*i) + (1 + 2*i)"), "3 + 5i");
    assert_eq!(run_one("(2 + i) * (3 + 2*i)"), "4 + 7i");
    assert_eq!(run_one("i * i"), "-1");
    assert_eq!(run_one("2i"), "2i");
    assert_eq!(run_one("(1 + i) / (1 - i)"), "i");
    // a complex result whose imaginary part cancels collapses
    assert_eq!(run_one("(2 + 3*i) - 3*i"), "2");
}

#[test]
fn test_matrix_arithmetic() {
    let mut interp = Interpreter::new();
    assert_eq!(
        run(&mut interp, "A = [[1, 2], [3, 4]]"),
        "[ [ 1 , 2 ] ; [ 3 , 4 ] ]"
    );
    run(&mut interp, "B = [[5, 6], [7, 8]]");
    assert_eq!(run(&mut interp, "A + B"), "[ [ 6 , 8 ] ; [ 10 , 12 ] ]");
    assert_eq!(run(&mut interp, "B - A"), "[ [ 4 , 4 ] ; [ 4 , 4 ] ]");
    // true matrix product
    assert_eq!(run(&mut interp, "A * B"), "[ [ 19 , 22 ] ; [ 43 , 50 ] ]");
    // scalar broadcast from both sides, cell-wise division
    assert_eq!(run(&mut interp, "A * 2"), "[ [ 2 , 4 ] ; [ 6 , 8 ] ]");
    assert_eq!(run(&mut interp, "2 * A"), "[ [ 2 , 4 ] ; [ 6 , 8 ] ]");
    assert_eq!(run(&mut interp, "A / 2"), "[ [ 1/2 , 1 ] ; [ 3/2 , 2 ] ]");
    // powers: identity, iterated product, inverse
    assert_eq!(run(&mut interp, "A ^ 0"), "[ [ 1 , 0 ] ; [ 0 , 1 ] ]");
    assert_eq!(run(&mut interp, "A ^ 2"), "[ [ 7 , 10 ] ; [ 15 , 22 ] ]");
    assert_eq!(
        run(&mut interp, "A ^ -1"),
        "[ [ -2 , 1 ] ; [ 3/2 , -1/2 ] ]"
    );
}

#[test]
fn test_matrix_inverse_scenario() {
    let mut interp = Interpreter::new();
    run(&mut interp, "A = [[1, 2], [3, 4]]");
    assert_eq!(
        run(&mut interp, "inv(A)"),
        "[ [ -2 , 1 ] ; [ 3/2 , -1/2 ] ]"
    );
    assert_eq!(
        run(&mut interp, "A * inv(A)"),
        "[ [ 1 , 0 ] ; [ 0 , 1 ] ]"
    );
}

#[test]
fn test_quadratic_with_positive_discriminant() {
    assert_eq!(
        run_one("x^2 - 5*x + 6 = 0 ?"),
        "Reduced form: x^2 - 5 * x + 6 = 0\n\
         Polynomial degree: 2\n\
         Discriminant: 1\n\
         Discriminant is strictly positive, the two solutions are:\n\
         3\n\
         2"
    );
}

#[test]
fn test_quadratic_with_negative_discriminant() {
    let out = run_one("x^2 + x + 1 = 0 ?");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Reduced form: x^2 + x + 1 = 0");
    assert_eq!(lines[1], "Polynomial degree: 2");
    assert_eq!(lines[2], "Discriminant: -3");
    assert_eq!(
        lines[3],
        "Discriminant is strictly negative, the two complex solutions are:"
    );
    assert_eq!(lines[4], "-1/2 + 0.8660254037844386i");
    assert_eq!(lines[5], "-1/2 - 0.8660254037844386i");
}

#[test]
fn test_roots_satisfy_the_equation() {
    // substitute each reported root back into lhs - rhs and check it
    // vanishes (within floating tolerance where approximation was used)
    for equation in [
        "x^2 - 5*x + 6 = 0 ?",
        "x^2 + x + 1 = 0 ?",
        "2*x^2 + 3*x - 7 = 0 ?",
        "x^2 + 4 = 0 ?",
    ] {
        let out = run_one(equation);
        let roots: Vec<&str> = out.lines().rev().take(2).collect();

        let statement = equation.trim_end_matches(['?', ' ']);
        let (lhs_src, rhs_src) = statement.split_once('=').unwrap();
        let difference = format!("({}) - ({})", lhs_src, rhs_src);
        let diff_expr = match Parser::parse_line(&difference).unwrap() {
            Stmt::Expr(e) => e,
            other => panic!("expected expression, got {other:?}"),
        };

        for root in roots {
            let root_expr = match Parser::parse_line(root).unwrap() {
                Stmt::Expr(e) => e,
                other => panic!("expected expression, got {other:?}"),
            };
            let env = Environment::new();
            let root_value = eval(&root_expr, &env).unwrap();
            let scope = Scope::new(&env, "x", root_value);
            let residual = eval(&diff_expr, &scope).unwrap();
            let size = match residual {
                Value::Rational(r) => r.to_f64().abs(),
                Value::Complex(c) => c.re.to_f64().abs() + c.im.to_f64().abs(),
                other => panic!("unexpected residual {other}"),
            };
            assert!(
                size < 1e-9,
                "{equation}: root {root} leaves residual {size}"
            );
        }
    }
}

#[test]
fn test_render_parse_round_trip() {
    // parse(render(v)) gives back v for rationals, complexes and matrices
    let mut interp = Interpreter::new();
    for source in [
        "7 / 2",
        "-3",
        "(2 + i) * (3 + 2*i)",
        "5 * i - 2",
        "[[1, 2], [3, 4]] / 2",
        "[[1 + i, 2], [0, 3 - i]]",
    ] {
        let rendered = run(&mut interp, source);
        assert_eq!(run(&mut interp, &rendered), rendered);
    }
}

#[test]
fn test_associativity_laws() {
    let a = Value::Rational(Rational::new(1.into(), 3.into()));
    let b = Value::Rational(Rational::new((-7).into(), 2.into()));
    let c = Value::Rational(Rational::new(5.into(), 6.into()));
    assert_eq!(
        a.add(&b).unwrap().add(&c).unwrap(),
        a.add(&b.add(&c).unwrap()).unwrap()
    );
    assert_eq!(
        a.mul(&b).unwrap().mul(&c).unwrap(),
        a.mul(&b.mul(&c).unwrap()).unwrap()
    );
}

#[test]
fn test_variables_and_functions() {
    let mut interp = Interpreter::new();
    assert_eq!(run(&mut interp, "x = 5"), "5");
    assert_eq!(run(&mut interp, "y = x + 2"), "7");
    // names are case-insensitive
    assert_eq!(run(&mut interp, "Y"), "7");
    // rebinding can change the type
    assert_eq!(run(&mut interp, "x = 2 + 3*i"), "2 + 3i");

    assert_eq!(interp.execute("f(t) = t^2 + 1").unwrap(), None);
    assert_eq!(run(&mut interp, "f(3)"), "10");
    // functions see variables defined at call time
    run(&mut interp, "k = 100");
    interp.execute("g(t) = t + k").unwrap();
    assert_eq!(run(&mut interp, "g(1)"), "101");
    run(&mut interp, "k = 200");
    assert_eq!(run(&mut interp, "g(1)"), "201");
}

#[test]
fn test_builtins_end_to_end() {
    let mut interp = Interpreter::new();
    assert_eq!(run(&mut interp, "sqrt(16)"), "4");
    assert_eq!(run(&mut interp, "sqrt(-9)"), "3i");
    assert_eq!(run(&mut interp, "abs(3 - 4*i)"), "5");
    assert_eq!(run(&mut interp, "floor(7/2)"), "3");
    assert_eq!(run(&mut interp, "ceil(7/2)"), "4");
    assert_eq!(run(&mut interp, "norm([[3, 4]])"), "5");
    assert_eq!(run(&mut interp, "exp(0)"), "1");
    assert_eq!(run(&mut interp, "log(1)"), "0");
}

#[test]
fn test_error_reporting_kinds() {
    let mut interp = Interpreter::new();
    assert!(matches!(interp.execute("2 $ 3"), Err(Error::Lex { .. })));
    assert!(matches!(interp.execute("2 +"), Err(Error::Parse { .. })));
    assert!(matches!(interp.execute("nope + 1"), Err(Error::Name(_))));
    assert!(matches!(interp.execute("i = 3"), Err(Error::Name(_))));
    assert!(matches!(
        interp.execute("[[1, 2], [3, 4]] / [[1, 2], [3, 4]]"),
        Err(Error::Type(_))
    ));
    assert!(matches!(
        interp.execute("abs([[1, 2], [3, 4]])"),
        Err(Error::Type(_))
    ));
    assert!(matches!(
        interp.execute("[[1, 2], [3]]"),
        Err(Error::Shape(_))
    ));
    assert!(matches!(
        interp.execute("[[1, 2]] + [[1], [2]]"),
        Err(Error::Shape(_))
    ));
    assert!(matches!(interp.execute("1 / 0"), Err(Error::Domain(_))));
    assert!(matches!(
        interp.execute("2 ^ (1/2)"),
        Err(Error::Domain(_))
    ));
    assert!(matches!(
        interp.execute("inv([[1, 2], [2, 4]])"),
        Err(Error::Domain(_))
    ));
    assert!(matches!(
        interp.execute("x^3 = 0 ?"),
        Err(Error::Unsupported(_))
    ));
    assert!(matches!(
        interp.execute("1 / x = 2 ?"),
        Err(Error::Unsupported(_))
    ));
}

#[test]
fn test_matrix_of_complex_cells() {
    let mut interp = Interpreter::new();
    run(&mut interp, "M = [[i, 0], [0, 1]]");
    assert_eq!(run(&mut interp, "M * M"), "[ [ -1 , 0 ] ; [ 0 , 1 ] ]");
    assert_eq!(run(&mut interp, "inv(M)"), "[ [ -i , 0 ] ; [ 0 , 1 ] ]");
}

#[test]
fn test_angle_mode_is_session_state() {
    let mut interp = Interpreter::new();
    assert_eq!(run(&mut interp, "sin(0)"), "0");
    run(&mut interp, "angles deg");
    assert_eq!(run(&mut interp, "cos(0)"), "1");
    assert_eq!(run(&mut interp, "sin(90)"), "1");
    run(&mut interp, "angles rad");
    assert_eq!(run(&mut interp, "angles"), "angle mode: radians");
}

#[test]
fn test_environment_survives_solver_queries() {
    let mut interp = Interpreter::new();
    run(&mut interp, "a = 1");
    run(&mut interp, "x^2 - 1 = 0 ?");
    // the unknown is not bound by solving
    assert!(matches!(interp.execute("x"), Err(Error::Name(_))));
    assert_eq!(run(&mut interp, "a"), "1");
}
