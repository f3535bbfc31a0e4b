pub mod attendance;
pub mod authority;
pub mod department;
pub mod notification;
pub mod operation_log;
pub mod parameter;
pub mod rank;
pub mod recruitment;
pub mod salary;
pub mod staff;
pub mod template;
