use std::fs;

use lms_core::model::{Chapter, ChapterId, CourseId, LearnerId};
use lms_core::time::fixed_now;
use services::{AppConfig, AppServices, Clock, ProjectDiscoveryConfig};

#[tokio::test]
async fn sqlite_backed_course_flow_gates_final_assignment() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = AppConfig {
        db_url: "sqlite:file:memdb_course_flow?mode=memory&cache=shared".to_string(),
        projects: ProjectDiscoveryConfig::new(tmp.path()),
    };
    let services = AppServices::new_sqlite(&config, Clock::fixed(fixed_now()))
        .await
        .expect("services");
    let course_progress = services.course_progress();

    let course = CourseId::new(3);
    let learner = LearnerId::new(1);
    for (id, title) in [(1, "Intro"), (2, "Basics"), (3, "Final_Assignment")] {
        let chapter = Chapter::from_title(ChapterId::new(id), course, title, id as i64)
            .expect("chapter");
        course_progress.add_chapter(&chapter).await.expect("add chapter");
    }

    course_progress
        .complete_chapter(learner, course, ChapterId::new(1))
        .await
        .expect("complete intro");
    let visible = course_progress
        .visible_chapters(learner, course)
        .await
        .expect("visible");
    let titles: Vec<&str> = visible.iter().map(Chapter::title).collect();
    assert_eq!(titles, vec!["Intro", "Basics"]);

    course_progress
        .complete_chapter(learner, course, ChapterId::new(2))
        .await
        .expect("complete basics");
    let visible = course_progress
        .visible_chapters(learner, course)
        .await
        .expect("visible");
    let titles: Vec<&str> = visible.iter().map(Chapter::title).collect();
    assert_eq!(titles, vec!["Intro", "Basics", "Final_Assignment"]);

    let other_learner = course_progress
        .visible_chapters(LearnerId::new(2), course)
        .await
        .expect("visible for other learner");
    assert_eq!(other_learner.len(), 2);
}

#[tokio::test]
async fn app_services_discover_projects_from_configured_root() {
    let tmp = tempfile::tempdir().expect("tempdir");
    for folder in ["memory-game", "quiz_app"] {
        let dir = tmp.path().join(folder);
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(dir.join("index.html"), "<html></html>").expect("index");
    }
    fs::write(tmp.path().join("quiz_app/project.json"), r#"{"order": 1}"#).expect("meta");

    let config = AppConfig {
        db_url: "sqlite:file:memdb_projects?mode=memory&cache=shared".to_string(),
        projects: ProjectDiscoveryConfig::new(tmp.path()),
    };
    let services = AppServices::new_sqlite(&config, Clock::default())
        .await
        .expect("services");

    let projects = services.projects().discover();
    let ids: Vec<&str> = projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["quiz-app", "memory-game"]);
    assert_eq!(
        services.projects().find_by_id("Memory-Game").map(|p| p.name),
        Some("Memory Game".to_string())
    );
}
