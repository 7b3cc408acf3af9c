//! Transpile real files and push the output through the rewrite engine.

use std::fs;

use flash_transform::{
    ArtifactLookup, OutputKind, OxcTranspiler, TranspileOptions, Transpiler, dependency_keys,
    rewrite_imports,
};
use tempfile::TempDir;

struct ReadyDeps;

impl ArtifactLookup for ReadyDeps {
    fn artifact_url(&self, key: &str) -> String {
        format!("/node_modules/.flash/deps/{}.js", key.replace('/', "_"))
    }

    fn is_ready(&self, _key: &str) -> bool {
        true
    }
}

fn transpiler() -> OxcTranspiler {
    OxcTranspiler::new(TranspileOptions {
        target: "es2020".to_string(),
        sourcemap: false,
    })
    .unwrap()
}

#[tokio::test]
async fn component_module_is_browser_loadable() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("App.tsx");
    fs::write(
        &path,
        r#"import { useState } from "react";
import logo from "./logo.svg";
import { Button } from "./Button";

type Props = { title: string };

export default function App({ title }: Props) {
    const [count, setCount] = useState<number>(0);
    return (
        <main>
            <img src={logo} />
            <h1>{title}</h1>
            <Button onClick={() => setCount(count + 1)}>{count}</Button>
        </main>
    );
}
"#,
    )
    .unwrap();

    let code = transpiler()
        .transpile(&path, OutputKind::Module)
        .await
        .unwrap();

    let keys = dependency_keys(&code).unwrap();
    assert!(keys.contains(&"react".to_string()));
    assert!(keys.contains(&"react/jsx-runtime".to_string()));

    let out = rewrite_imports(&code, &ReadyDeps).unwrap();
    assert!(out.code.contains("/node_modules/.flash/deps/react.js"));
    assert!(out.code.contains("/node_modules/.flash/deps/react_jsx-runtime.js"));
    assert!(out.code.contains("./logo.svg?import"));
    assert!(out.code.contains("\"./Button\""));
    assert!(out.code.contains("const useState = "));
    assert!(!out.code.contains("from \"react\""));
    assert!(!out.code.contains("Props"));
}

#[tokio::test]
async fn rewriting_twice_is_stable_for_paths_and_assets() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("icons.js");
    fs::write(
        &path,
        "import a from './a.png';\nimport b from '../b.pdf?v=3';\nexport { helper } from './helper.js';\n",
    )
    .unwrap();

    let code = transpiler()
        .transpile(&path, OutputKind::Module)
        .await
        .unwrap();
    let once = rewrite_imports(&code, &ReadyDeps).unwrap();
    let twice = rewrite_imports(&once.code, &ReadyDeps).unwrap();

    assert_eq!(once.code, twice.code);
    assert!(once.code.contains("./a.png?import"));
    assert!(once.code.contains("../b.pdf?v=3&import"));
}

#[tokio::test]
async fn script_output_rejects_module_syntax() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("legacy.js");
    fs::write(&path, "export const x = 1;\n").unwrap();

    let err = transpiler()
        .transpile(&path, OutputKind::Script)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("legacy.js"));
}
