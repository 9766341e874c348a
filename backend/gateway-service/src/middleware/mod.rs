pub mod jwt_gate;

pub use jwt_gate::JwtGateMiddleware;
