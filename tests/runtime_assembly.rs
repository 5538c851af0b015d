use runtime_sync::{
    assemble_runtime, run_summary, AssemblyPlan, IgnoreRuleSet, MemorySink, SummaryPlan, UnitStatus,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project_with_builds(root: &Path) {
    write(&root.join("apps/main/dist/index.html"), "<main>");
    write(&root.join("apps/main/dist/app.js"), "main");
    write(&root.join("apps/main/dist/app.js.map"), "{}");
    write(&root.join("apps/window/dist/index.html"), "<window>");
    write(&root.join("apps/window/dist/assets/chat.css"), "body {}");
    write(&root.join("apps/window/dist/.DS_Store"), "");
    write(&root.join("apps/fast-window/fast.html"), "<fast>");
    write(&root.join("apps/fast-window/node_modules/x/index.js"), "dep");
    write(&root.join("apps/backend/public/preload.js"), "preload v2");
    write(&root.join("apps/backend/public/window_preload.js"), "window preload v2");
    write(&root.join("apps/backend/public/plugin.json"), "{}");
    write(&root.join("apps/backend/public/debug.log"), "noise");
}

#[test]
fn full_assembly_builds_runtime_layout() {
    let root = TempDir::new().unwrap();
    project_with_builds(root.path());
    let runtime = root.path().join("runtime");
    write(&runtime.join("main/stale.js"), "stale");
    write(&runtime.join("fast_window_preload.js"), "old");

    let plan = AssemblyPlan::standard(root.path(), &runtime);
    let report = assemble_runtime(&plan, &IgnoreRuleSet::build_artifacts()).unwrap();

    assert!(report.units.iter().all(|u| u.status == UnitStatus::Synced));
    assert!(!runtime.join("main/stale.js").exists());
    assert!(!runtime.join("main/app.js.map").exists());
    assert!(runtime.join("main/app.js").is_file());
    assert!(runtime.join("window/assets/chat.css").is_file());
    assert!(!runtime.join("window/.DS_Store").exists());
    assert!(runtime.join("fast_window/fast.html").is_file());
    assert!(!runtime.join("fast_window/node_modules").exists());
    assert_eq!(fs::read_to_string(runtime.join("preload.js")).unwrap(), "preload v2");
    assert!(runtime.join("plugin.json").is_file());
    assert!(!runtime.join("fast_window_preload.js").exists());
    assert!(!runtime.join("debug.log").exists());

    for unit in ["main", "window", "fast_window"] {
        assert!(runtime.join(unit).join(".gitkeep").is_file(), "{} lacks placeholder", unit);
    }
    assert_eq!(report.placeholders_created.len(), 3);
}

#[test]
fn missing_window_build_does_not_block_other_units() {
    let root = TempDir::new().unwrap();
    project_with_builds(root.path());
    fs::remove_dir_all(root.path().join("apps/window/dist")).unwrap();
    let runtime = root.path().join("runtime");
    write(&runtime.join("window/old.js"), "old");

    let plan = AssemblyPlan::standard(root.path(), &runtime);
    let report = assemble_runtime(&plan, &IgnoreRuleSet::build_artifacts()).unwrap();

    assert_eq!(report.unit("window").unwrap().status, UnitStatus::SourceMissing);
    assert!(!runtime.join("window").exists());
    assert_eq!(report.unit("main").unwrap().status, UnitStatus::Synced);
    assert_eq!(report.unit("fast_window").unwrap().status, UnitStatus::Synced);
    assert!(runtime.join("main/.gitkeep").is_file());
    assert!(runtime.join("fast_window/fast.html").is_file());
    assert!(!report.has_failures());
}

#[test]
fn second_assembly_run_is_stable() {
    let root = TempDir::new().unwrap();
    project_with_builds(root.path());
    let runtime = root.path().join("runtime");
    let plan = AssemblyPlan::standard(root.path(), &runtime);
    let rules = IgnoreRuleSet::build_artifacts();

    assemble_runtime(&plan, &rules).unwrap();
    let report = assemble_runtime(&plan, &rules).unwrap();

    // targets are rebuilt from scratch, so placeholders are created again but never doubled
    assert_eq!(report.placeholders_created.len(), 3);
    let mut names: Vec<String> = fs::read_dir(runtime.join("main"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec![".gitkeep", "app.js", "index.html"]);
}

#[test]
fn standard_summary_over_project_tree() {
    let root = TempDir::new().unwrap();
    let r = root.path();
    write(&r.join("utools-api-doc.md"), "API");
    write(&r.join("README.md"), "README");
    write(&r.join("apps/backend/src/preload.js"), "preload");
    for app in ["main", "window"] {
        write(&r.join(format!("apps/{}/package.json", app)), "{}");
        write(&r.join(format!("apps/{}/vite.config.js", app)), "export default {}");
        write(&r.join(format!("apps/{}/src/App.vue", app)), "<template/>");
        fs::create_dir_all(r.join(format!("apps/{}/src/components", app))).unwrap();
    }
    write(&r.join("apps/main/index.html"), "<html>");
    fs::create_dir_all(r.join("apps/main/src/locales")).unwrap();
    fs::create_dir_all(r.join("apps/window/src/utils")).unwrap();
    write(&r.join("apps/window/src/assets/logo.png"), "png");
    write(&r.join("apps/fast-window/fast.html"), "<fast>");
    write(&r.join("docs/guide.md"), "guide");

    let plan = SummaryPlan::standard(r);
    let mut sink = MemorySink::new();
    run_summary(&plan, Some(&mut sink)).unwrap();

    let text = fs::read_to_string(r.join("result.txt")).unwrap();
    assert_eq!(sink.last(), Some(text.as_str()));
    assert!(text.starts_with("以下是Utools插件的开发文档\nAPI\n"));
    assert!(text.contains("```js\napps/backend/src/preload.js\npreload\n```\n"));
    assert!(text.contains("```vue\napps/window/src/App.vue\n<template/>\n```\n"));
    assert!(text.contains("```md\ndocs/guide.md\nguide\n```\n"));
    assert!(!text.contains("logo.png"));
    assert!(text.ends_with("不用给出全部文件代码\n\n"));
}
