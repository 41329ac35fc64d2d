//! Node server entry points written into server-rendered artifacts.
//!
//! Frameworks that ship a server runtime rather than static files get a
//! small entry script so every container starts the same way, regardless
//! of how the project itself wires up its scripts.

/// Starts the Next.js production server against the prebuilt `.next` output.
pub const NEXTJS_SERVER_JS: &str = r#"const next = require('next');
const http = require('http');

const port = parseInt(process.env.PORT || '3000', 10);
const app = next({ dev: false, dir: __dirname });
const handle = app.getRequestHandler();

app.prepare().then(() => {
  http.createServer((req, res) => handle(req, res)).listen(port, () => {
    console.log(`ready on port ${port}`);
  });
});
"#;

/// Runs the SvelteKit node adapter output. The adapter emits ES modules,
/// and the artifact carries no `package.json`, so the shim ships as
/// `server.mjs` to force module parsing on older node images.
pub const SVELTEKIT_SERVER_MJS: &str = r#"import { handler } from './handler.js';
import http from 'http';

const port = parseInt(process.env.PORT || '3000', 10);
http.createServer(handler).listen(port, () => {
  console.log(`ready on port ${port}`);
});
"#;

/// Serves a Remix build with remix-serve.
pub const REMIX_SERVER_JS: &str = r#"const path = require('path');
const { createRequestHandler } = require('@remix-run/serve');
const http = require('http');

const port = parseInt(process.env.PORT || '3000', 10);
const handler = createRequestHandler(path.join(__dirname, 'build'));
http.createServer(handler).listen(port, () => {
  console.log(`ready on port ${port}`);
});
"#;
