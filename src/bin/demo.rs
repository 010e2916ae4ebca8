//! Fills a local storage folder with a week of sample tasks, then plays a few actions on it.
//! Set the RUST_LOG environment variable to see what happens under the hood.

use std::path::Path;

use week_planner::calendar::sample_week;
use week_planner::codec;
use week_planner::storage::{FileStorage, Storage};
use week_planner::view::{CalendarView, TaskForm};
use week_planner::utils::{date_key, print_calendar};

const STORAGE_FOLDER: &str = "demo_storage";

fn main() {
    env_logger::init();

    let mut storage = FileStorage::new(Path::new(STORAGE_FOLDER));
    let (mut view, error) = CalendarView::open(storage.clone());
    if let Some(err) = error {
        log::warn!("Invalid stored calendar: {}. Starting from scratch", err);
    }

    if view.calendar().is_empty() {
        let monday = view.visible_week()[0];
        let seed = sample_week(&monday);
        match codec::encode(&seed).and_then(|text| storage.write(view.storage_key(), &text)) {
            Err(err) => log::error!("Unable to store sample data: {}", err),
            Ok(()) => {
                let (reopened, _) = CalendarView::open(storage);
                view = reopened;
            }
        }
    }

    view.subscribe(|calendar| println!("(calendar changed, {} tasks)", calendar.task_count()));

    println!("---- stored tasks -----");
    print_calendar(&view.calendar());

    let week = view.visible_week();
    let form = TaskForm::new("Demo task", "Created by the demo", &date_key(&week[2]), "14:30", "#f44336");
    let id = form.identifier.clone();
    if let Err(err) = view.create_or_update_task(form) {
        log::error!("Unable to create a task: {}", err);
    }
    if let Err(err) = view.complete_task(&id, &date_key(&week[2])) {
        log::error!("Unable to complete a task: {}", err);
    }

    println!("---- after changes -----");
    print_calendar(&view.calendar());
}
