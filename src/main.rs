#[macro_use]
extern crate rocket;

use rocket::http::Status;
use rocket::response::content;
use rocket::serde::json::Json;
use rocket::State;
use rocket_cors::{AllowedOrigins, CorsOptions};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use conquerdia_map::{
    command::{self, Command, CommandReport, MapEdit},
    map_io::MapFiles,
    settings::Settings,
    world_map::WorldMap,
};

#[derive(Deserialize, Clone)]
struct FileData {
    file_name: String,
}

#[derive(Deserialize, Clone)]
struct EditData {
    edits: Vec<MapEdit>,
}

struct CommandWithResponse {
    command: Command,
    response_sender: oneshot::Sender<CommandReport>,
}

struct SharedState {
    sender: mpsc::Sender<CommandWithResponse>,
}

#[derive(Serialize)]
struct ApiEndpoint {
    path: &'static str,
    method: &'static str,
    description: &'static str,
}

const ENDPOINTS: &[ApiEndpoint] = &[
    ApiEndpoint {
        path: "/",
        method: "GET",
        description: "Shows this API documentation",
    },
    ApiEndpoint {
        path: "/map-state",
        method: "GET",
        description: "Get the continents, countries and lifecycle of the current map",
    },
    ApiEndpoint {
        path: "/editmap",
        method: "POST",
        description: "Open a map file for editing, or start a new map if it does not exist",
    },
    ApiEndpoint {
        path: "/loadmap",
        method: "POST",
        description: "Load a map file for playing; the map must pass validation",
    },
    ApiEndpoint {
        path: "/savemap",
        method: "POST",
        description: "Save the map being edited",
    },
    ApiEndpoint {
        path: "/edit",
        method: "POST",
        description: "Apply a list of continent, country, neighbour, army and owner edits",
    },
    ApiEndpoint {
        path: "/validatemap",
        method: "GET",
        description: "Check that the map and every continent are connected",
    },
    ApiEndpoint {
        path: "/showmap",
        method: "GET",
        description: "Show the map as text",
    },
];

#[get("/")]
fn api_documentation() -> content::RawJson<String> {
    content::RawJson(serde_json::to_string_pretty(ENDPOINTS).unwrap_or_default())
}

#[post("/editmap", data = "<data>")]
async fn edit_map(
    data: Json<FileData>,
    state: &State<SharedState>,
) -> Result<Json<CommandReport>, Status> {
    let FileData { file_name } = data.into_inner();
    send_command_and_wait(state, Command::EditMap { file_name }).await
}

#[post("/loadmap", data = "<data>")]
async fn load_map(
    data: Json<FileData>,
    state: &State<SharedState>,
) -> Result<Json<CommandReport>, Status> {
    let FileData { file_name } = data.into_inner();
    send_command_and_wait(state, Command::LoadMap { file_name }).await
}

#[post("/savemap", data = "<data>")]
async fn save_map(
    data: Json<FileData>,
    state: &State<SharedState>,
) -> Result<Json<CommandReport>, Status> {
    let FileData { file_name } = data.into_inner();
    send_command_and_wait(state, Command::SaveMap { file_name }).await
}

#[post("/edit", data = "<data>")]
async fn edit(
    data: Json<EditData>,
    state: &State<SharedState>,
) -> Result<Json<CommandReport>, Status> {
    let EditData { edits } = data.into_inner();
    send_command_and_wait(state, Command::Edit { edits }).await
}

#[get("/validatemap")]
async fn validate_map(state: &State<SharedState>) -> Result<Json<CommandReport>, Status> {
    send_command_and_wait(state, Command::ValidateMap).await
}

#[get("/showmap")]
async fn show_map(state: &State<SharedState>) -> Result<Json<CommandReport>, Status> {
    send_command_and_wait(state, Command::ShowMap).await
}

#[get("/map-state")]
async fn map_state(state: &State<SharedState>) -> Result<Json<CommandReport>, Status> {
    send_command_and_wait(state, Command::GetMapState).await
}

async fn send_command_and_wait(
    state: &State<SharedState>,
    command: Command,
) -> Result<Json<CommandReport>, Status> {
    let (response_sender, response_receiver) = oneshot::channel();
    state
        .sender
        .send(CommandWithResponse {
            command,
            response_sender,
        })
        .await
        .map_err(|_| Status::ServiceUnavailable)?;

    let report = response_receiver
        .await
        .map_err(|_| Status::InternalServerError)?;
    Ok(Json(report))
}

async fn worker_task(
    mut receiver: mpsc::Receiver<CommandWithResponse>,
    map: Arc<Mutex<WorldMap>>,
) {
    while let Some(CommandWithResponse {
        command,
        response_sender,
    }) = receiver.recv().await
    {
        let mut map = map.lock().await;
        let report = command::execute(&mut map, command);
        if response_sender.send(report).is_err() {
            warn!("client went away before the command finished");
        }
    }
}

#[launch]
async fn rocket() -> _ {
    let settings = Settings::from_env();
    let log_filter = settings
        .as_ref()
        .map(|s| s.log_filter.clone())
        .unwrap_or_else(|_| Settings::default().log_filter);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let settings = settings.unwrap_or_else(|e| {
        warn!(error = %e, "invalid settings, using defaults");
        Settings::default()
    });
    info!(map_directory = %settings.map_directory.display(), "serving maps");

    let (sender, receiver) = mpsc::channel::<CommandWithResponse>(settings.channel_capacity);
    let map = Arc::new(Mutex::new(WorldMap::with_files(MapFiles::new(
        settings.map_directory.clone(),
    ))));

    tokio::spawn(worker_task(receiver, map.clone()));

    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .to_cors()
        .expect("Error creating CORS middleware");

    rocket::build()
        .manage(SharedState { sender })
        .mount(
            "/",
            routes![
                api_documentation,
                edit_map,
                load_map,
                save_map,
                edit,
                validate_map,
                show_map,
                map_state
            ],
        )
        .attach(cors)
}
