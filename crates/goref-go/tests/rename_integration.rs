//! End-to-end `rename` tests: files on disk are rewritten and re-analyzed.

use std::fs;
use std::path::PathBuf;

use goref_core::error::RefactorError;
use goref_core::ops::{list_refs, rename, RenameOptions};
use goref_core::rewrite::WriteMode;
use goref_go::GoAdapter;
use tempfile::TempDir;

fn setup_module(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp.path().join("go.mod"), "module example.com/demo\n\ngo 1.22\n")
        .expect("Failed to write go.mod");
    for (path, content) in files {
        let full_path = temp.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directories");
        }
        fs::write(&full_path, content).expect("Failed to write file");
    }
    temp
}

fn path_in(temp: &TempDir, rel: &str) -> PathBuf {
    temp.path().join(rel)
}

fn read(temp: &TempDir, rel: &str) -> String {
    fs::read_to_string(path_in(temp, rel)).expect("Failed to read file")
}

fn do_rename(temp: &TempDir, file: &str, old: &str, new: &str) -> Result<goref_core::output::RenameReport, RefactorError> {
    rename(
        &GoAdapter::new(),
        &path_in(temp, file),
        old,
        new,
        RenameOptions::default(),
    )
}

mod greet {
    use super::*;

    const A: &str = "package main\n\nfunc Greet() {}\n";
    const B: &str = "package main\n\nfunc main() {\n\tGreet()\n\tGreet()\n}\n";

    #[test]
    fn rewrites_declaration_and_calls() {
        let temp = setup_module(&[("a.go", A), ("b.go", B)]);
        let report = do_rename(&temp, "a.go", "Greet", "Hello").unwrap();

        assert_eq!(report.result.count_for("a.go"), Some(1));
        assert_eq!(report.result.count_for("b.go"), Some(2));
        assert_eq!(report.result.total(), 3);
        assert_eq!(read(&temp, "a.go"), "package main\n\nfunc Hello() {}\n");
        assert_eq!(
            read(&temp, "b.go"),
            "package main\n\nfunc main() {\n\tHello()\n\tHello()\n}\n"
        );
        assert_eq!(
            report.render_text(),
            "Renamed 'Greet' -> 'Hello' in:\n- a.go (1 occurrences)\n- b.go (2 occurrences)\n"
        );
    }

    #[test]
    fn renamed_program_still_resolves() {
        let temp = setup_module(&[("a.go", A), ("b.go", B)]);
        do_rename(&temp, "a.go", "Greet", "Hello").unwrap();

        let report = list_refs(&GoAdapter::new(), &path_in(&temp, "a.go"), "Hello").unwrap();
        assert_eq!(report.render_text(), "b.go:4:2\nb.go:5:2\n");
        let err = list_refs(&GoAdapter::new(), &path_in(&temp, "a.go"), "Greet").unwrap_err();
        assert!(matches!(err, RefactorError::SymbolNotFound { .. }));
    }

    #[test]
    fn atomic_mode_gives_same_result() {
        let temp = setup_module(&[("a.go", A), ("b.go", B)]);
        let report = rename(
            &GoAdapter::new(),
            &path_in(&temp, "a.go"),
            "Greet",
            "Hello",
            RenameOptions {
                write_mode: WriteMode::Atomic,
            },
        )
        .unwrap();
        assert_eq!(report.result.total(), 3);
        assert_eq!(read(&temp, "a.go"), "package main\n\nfunc Hello() {}\n");
    }
}

mod safety {
    use super::*;

    #[test]
    fn collision_leaves_files_untouched() {
        let a = "package main\n\nfunc Greet() {}\n\nfunc Hello() {}\n";
        let b = "package main\n\nfunc main() { Greet(); Hello() }\n";
        let temp = setup_module(&[("a.go", a), ("b.go", b)]);

        let err = do_rename(&temp, "a.go", "Greet", "Hello").unwrap_err();
        assert!(matches!(err, RefactorError::Conflict { .. }));
        assert_eq!(
            err.to_string(),
            "new symbol name Hello conflicts with existing symbol"
        );
        assert_eq!(read(&temp, "a.go"), a);
        assert_eq!(read(&temp, "b.go"), b);
    }

    #[test]
    fn collision_across_files_of_one_package() {
        let temp = setup_module(&[
            ("a.go", "package main\n\nfunc Greet() {}\n"),
            ("c.go", "package main\n\nvar Hello = 1\n"),
        ]);
        let err = do_rename(&temp, "a.go", "Greet", "Hello").unwrap_err();
        assert!(matches!(err, RefactorError::Conflict { .. }));
    }

    #[test]
    fn keyword_rejected() {
        let temp = setup_module(&[("a.go", "package main\n\nfunc Greet() {}\n")]);
        let err = do_rename(&temp, "a.go", "Greet", "func").unwrap_err();
        assert!(matches!(err, RefactorError::InvalidArguments { .. }));
        assert_eq!(read(&temp, "a.go"), "package main\n\nfunc Greet() {}\n");
    }

    #[test]
    fn same_name_rejected() {
        let temp = setup_module(&[("a.go", "package main\n\nfunc Greet() {}\n")]);
        let err = do_rename(&temp, "a.go", "Greet", "Greet").unwrap_err();
        assert!(matches!(err, RefactorError::InvalidArguments { .. }));
    }

    #[test]
    fn similar_identifiers_are_not_touched() {
        let a = "package main\n\nvar X = 1\nvar XX = X + 2\n\nfunc F() string { return \"X\" }\n";
        let temp = setup_module(&[("a.go", a)]);
        let report = do_rename(&temp, "a.go", "X", "Y").unwrap();
        assert_eq!(report.result.total(), 2);
        assert_eq!(
            read(&temp, "a.go"),
            "package main\n\nvar Y = 1\nvar XX = Y + 2\n\nfunc F() string { return \"X\" }\n"
        );
    }

    #[test]
    fn longer_new_name_keeps_offsets_straight() {
        let a = "package main\n\nfunc F() {}\n\nfunc main() { F(); F(); F() }\n";
        let temp = setup_module(&[("a.go", a)]);
        do_rename(&temp, "a.go", "F", "Function").unwrap();
        assert_eq!(
            read(&temp, "a.go"),
            "package main\n\nfunc Function() {}\n\nfunc main() { Function(); Function(); Function() }\n"
        );
    }
}

mod scoping {
    use super::*;

    #[test]
    fn shadowing_local_is_left_alone() {
        let a = concat!(
            "package main\n",
            "\n",
            "var count = 0\n",
            "\n",
            "func inc() { count++ }\n",
            "\n",
            "func local() int {\n",
            "\tcount := 5\n",
            "\treturn count\n",
            "}\n",
        );
        let temp = setup_module(&[("a.go", a)]);
        let report = do_rename(&temp, "a.go", "count", "total").unwrap();
        assert_eq!(report.result.total(), 2);
        let text = read(&temp, "a.go");
        assert!(text.contains("var total = 0"));
        assert!(text.contains("func inc() { total++ }"));
        assert!(text.contains("\tcount := 5\n\treturn count\n"));
    }

    #[test]
    fn qualified_method_rename() {
        let a = concat!(
            "package main\n",
            "\n",
            "type Server struct{}\n",
            "type Client struct{}\n",
            "\n",
            "func (s *Server) Start() {}\n",
            "func (c *Client) Start() {}\n",
            "\n",
            "func main() {\n",
            "\ts := &Server{}\n",
            "\tc := &Client{}\n",
            "\ts.Start()\n",
            "\tc.Start()\n",
            "}\n",
        );
        let temp = setup_module(&[("a.go", a)]);
        let report = do_rename(&temp, "a.go", "Server.Start", "Server.Launch").unwrap();
        assert_eq!(report.new_name, "Launch");
        assert_eq!(report.result.total(), 2);
        let text = read(&temp, "a.go");
        assert!(text.contains("func (s *Server) Launch() {}"));
        assert!(text.contains("func (c *Client) Start() {}"));
        assert!(text.contains("\ts.Launch()\n\tc.Start()\n"));
    }

    #[test]
    fn method_rename_collides_with_sibling_method() {
        let a = "package main\n\ntype T struct{}\n\nfunc (T) A() {}\nfunc (T) B() {}\n";
        let temp = setup_module(&[("a.go", a)]);
        let err = do_rename(&temp, "a.go", "T.A", "B").unwrap_err();
        assert!(matches!(err, RefactorError::Conflict { .. }));
        assert_eq!(read(&temp, "a.go"), a);
    }

    #[test]
    fn qualified_new_name_must_match_owner() {
        let a = "package main\n\ntype T struct{}\n\nfunc (T) A() {}\n";
        let temp = setup_module(&[("a.go", a)]);
        let err = do_rename(&temp, "a.go", "T.A", "U.A2").unwrap_err();
        assert!(matches!(err, RefactorError::InvalidArguments { .. }));
    }

    #[test]
    fn cross_package_rename_with_import_alias() {
        let temp = setup_module(&[
            ("shapes/shapes.go", "package shapes\n\ntype Square struct {\n\tSide int\n}\n\nfunc (s Square) Area() int { return s.Side * s.Side }\n"),
            ("main.go", "package main\n\nimport sh \"example.com/demo/shapes\"\n\nfunc main() {\n\tsq := sh.Square{Side: 2}\n\t_ = sq.Area()\n}\n"),
        ]);
        let report = do_rename(&temp, "shapes/shapes.go", "Side", "Length").unwrap();
        assert_eq!(report.result.count_for("shapes/shapes.go"), Some(3));
        assert_eq!(report.result.count_for("main.go"), Some(1));
        assert!(read(&temp, "main.go").contains("sh.Square{Length: 2}"));

        let report = do_rename(&temp, "shapes/shapes.go", "Square", "Quad").unwrap();
        assert_eq!(report.result.total(), 3);
        assert!(read(&temp, "main.go").contains("sq := sh.Quad{Length: 2}"));
        assert!(read(&temp, "shapes/shapes.go").contains("func (s Quad) Area() int"));
    }

    #[test]
    fn test_files_are_rewritten() {
        let temp = setup_module(&[
            ("calc/calc.go", "package calc\n\nfunc Add(a, b int) int { return a + b }\n"),
            ("calc/calc_test.go", "package calc\n\nfunc check() int { return Add(1, 2) }\n"),
            ("calc/ext_test.go", "package calc_test\n\nimport \"example.com/demo/calc\"\n\nfunc ext() int { return calc.Add(3, 4) }\n"),
        ]);
        let report = do_rename(&temp, "calc/calc.go", "Add", "Sum").unwrap();
        assert_eq!(report.result.count_for("calc/calc_test.go"), Some(1));
        assert_eq!(report.result.count_for("calc/ext_test.go"), Some(1));
        assert!(read(&temp, "calc/ext_test.go").contains("calc.Sum(3, 4)"));
    }
}
