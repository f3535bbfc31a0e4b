pub mod attendance_record;
pub mod calculation_rule;
pub mod clock_in;
pub mod company;
pub mod department;
pub mod insurance_rate;
pub mod leave_request;
pub mod notification;
pub mod operation_log;
pub mod punch_request;
pub mod rank;
pub mod recruitment;
pub mod salary;
pub mod staff;
pub mod system_parameter;
pub mod tax_bracket;
pub mod template;
