// handlers/mod.rs - Route handlers, one module per resource
//
// Access rules are applied by middleware when the routes are assembled in
// server.rs; handlers here only validate input and call the services.
//
//   auth       POST /auth/token, /auth/register          (public)
//   companies  /companies[/:handle]                      (reads public, writes admin)
//   jobs       /jobs[/:id]                               (reads public, writes admin)
//   users      /users[/:username]                        (admin, or the user themself)
//   health     GET /health                               (public)

pub mod auth;
pub mod companies;
pub mod health;
pub mod jobs;
pub mod users;
