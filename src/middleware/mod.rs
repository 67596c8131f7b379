/*
 * Responsibility
 * - Router-level layers shared by the services
 *   - auth: credential -> AuthCtx, then the route policy gate
 *   - http: request id, access log, body limit, timeout, security headers
 *   - cors: browser origin policy
 */
pub mod auth;
pub mod cors;
pub mod http;
