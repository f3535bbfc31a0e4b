use crate::model::attendance::{
    AttendanceRecord, ClockIn, CreateAttendanceRecordRequest, CreateClockInRequest,
    CreateLeaveRequestRequest, CreatePunchRequestRequest, LeaveRequest, PunchRequest,
    UpdateAttendanceRecordRequest, UpdateClockInRequest, UpdateLeaveRequestRequest,
    UpdatePunchRequestRequest,
};
use crate::model::authority::{BranchCompany, LoginRequest, SetPasswordRequest};
use crate::model::department::{CreateDepartmentRequest, Department, UpdateDepartmentRequest};
use crate::model::notification::{CreateNotificationRequest, Notification, UpdateNotificationRequest};
use crate::model::parameter::{
    CalculationRule, CreateCalculationRuleRequest, CreateInsuranceRateRequest,
    CreateSystemParameterRequest, CreateTaxBracketRequest, InsuranceRate, InsuranceType,
    ParameterHistory, RuleType, SystemParameter, TaxBracket, UpdateCalculationRuleRequest,
    UpdateInsuranceRateRequest, UpdateSystemParameterRequest, UpdateTaxBracketRequest,
};
use crate::model::rank::{CreateRankRequest, Rank, UpdateRankRequest};
use crate::model::recruitment::{
    Candidate, CreateCandidateRequest, CreateRecruitmentRequest, Recruitment,
    UpdateCandidateRequest, UpdateRecruitmentRequest,
};
use crate::model::salary::{CreateSalaryRequest, Salary, SalaryRecord, UpdateSalaryRequest};
use crate::model::staff::{
    CreateStaffRequest, OnboardStaffRequest, PromoteStaffRequest, ResignStaffRequest, Staff,
    TransferStaffRequest, UpdateStaffRequest,
};
use crate::model::template::{
    ApplyTemplateRequest, CalculationType, CreateTemplateRequest, ItemType, SalaryTemplate,
    SalaryTemplateItem, TemplateAmounts, TemplateItemRequest, ToggleTemplateRequest,
    UpdateTemplateRequest,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS Backend API",
        version = "1.0.0",
        description = r#"
Multi-tenant HR and payroll management backend.

- **Staff**: profiles, lifecycle (onboard/promote/transfer/resign), Excel bulk import
- **Attendance**: raw punches, monthly aggregation, leave/punch approval workflows
- **Payroll**: configurable tax brackets, insurance rates, calculation rules and
  system parameters driving the monthly salary computation
- **Templates**: reusable pay-structure templates scoped by rank/department

Every response uses the envelope `{code, status, message, data[, total]}` over
HTTP 200; business failures set `status: false` and an application code.
Authentication is the opaque `user_cookie` session cookie set by login; the
cookie's branch id selects the tenant database.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::quit,
        crate::auth::handlers::set_password,

        crate::api::company::query_companies,

        crate::api::staff::create_staff,
        crate::api::staff::update_staff,
        crate::api::staff::delete_staff,
        crate::api::staff::query_staff,
        crate::api::staff::query_staff_by_name,
        crate::api::staff::query_staff_by_dep,
        crate::api::staff::onboard_staff,
        crate::api::staff::promote_staff,
        crate::api::staff::transfer_staff,
        crate::api::staff::resign_staff,
        crate::api::staff::import_staff,

        crate::api::department::create_department,
        crate::api::department::delete_department,
        crate::api::department::update_department,
        crate::api::department::query_departments,

        crate::api::rank::create_rank,
        crate::api::rank::delete_rank,
        crate::api::rank::update_rank,
        crate::api::rank::query_ranks,

        crate::api::attendance_record::create_attendance_record,
        crate::api::attendance_record::update_attendance_record,
        crate::api::attendance_record::delete_attendance_record,
        crate::api::attendance_record::query_attendance_records,
        crate::api::attendance_record::query_attendance_history,
        crate::api::attendance_record::attendance_is_paid,
        crate::api::attendance_record::query_pending_approvals,
        crate::api::attendance_record::approve_accept,
        crate::api::attendance_record::approve_reject,

        crate::api::clock_in::create_clock_in,
        crate::api::clock_in::update_clock_in,
        crate::api::clock_in::query_clock_ins,

        crate::api::leave_request::create_leave_request,
        crate::api::leave_request::update_leave_request,
        crate::api::leave_request::query_leave_requests,
        crate::api::leave_request::query_pending_leaves,
        crate::api::leave_request::approve_leave_accept,
        crate::api::leave_request::approve_leave_reject,

        crate::api::punch_request::create_punch_request,
        crate::api::punch_request::update_punch_request,
        crate::api::punch_request::query_punch_requests,
        crate::api::punch_request::query_pending_punches,
        crate::api::punch_request::approve_punch_accept,
        crate::api::punch_request::approve_punch_reject,

        crate::api::salary::create_salary,
        crate::api::salary::delete_salary,
        crate::api::salary::update_salary,
        crate::api::salary::query_salaries,
        crate::api::salary::query_salary_records,
        crate::api::salary::get_salary_record_is_pay,
        crate::api::salary::pay_salary_record,
        crate::api::salary::query_paid_salary_records,

        crate::api::tax_bracket::create_tax_bracket,
        crate::api::tax_bracket::query_tax_brackets,
        crate::api::tax_bracket::update_tax_bracket,
        crate::api::tax_bracket::delete_tax_bracket,

        crate::api::insurance_rate::create_insurance_rate,
        crate::api::insurance_rate::query_insurance_rates,
        crate::api::insurance_rate::update_insurance_rate,
        crate::api::insurance_rate::delete_insurance_rate,

        crate::api::calculation_rule::create_calculation_rule,
        crate::api::calculation_rule::query_calculation_rules,
        crate::api::calculation_rule::get_calculation_rule_value,
        crate::api::calculation_rule::update_calculation_rule,
        crate::api::calculation_rule::delete_calculation_rule,

        crate::api::system_parameter::create_system_parameter,
        crate::api::system_parameter::query_system_parameters,
        crate::api::system_parameter::get_system_parameter_value,
        crate::api::system_parameter::update_system_parameter,
        crate::api::system_parameter::delete_system_parameter,
        crate::api::system_parameter::query_parameter_history,

        crate::api::template::create_template,
        crate::api::template::update_template,
        crate::api::template::delete_template,
        crate::api::template::get_template,
        crate::api::template::query_templates,
        crate::api::template::apply_template,
        crate::api::template::applicable_templates,
        crate::api::template::toggle_template,

        crate::api::notification::create_notification,
        crate::api::notification::delete_notification,
        crate::api::notification::update_notification,
        crate::api::notification::query_notifications,

        crate::api::recruitment::create_recruitment,
        crate::api::recruitment::delete_recruitment,
        crate::api::recruitment::update_recruitment,
        crate::api::recruitment::query_recruitments,
        crate::api::recruitment::create_candidate,
        crate::api::recruitment::delete_candidate,
        crate::api::recruitment::update_candidate,
        crate::api::recruitment::query_candidates_by_name,
        crate::api::recruitment::query_candidates_by_staff,
        crate::api::recruitment::accept_candidate,
        crate::api::recruitment::reject_candidate,

        crate::api::operation_log::query_operation_logs,
        crate::api::operation_log::get_operation_log,
        crate::api::operation_log::operation_log_stats,
        crate::api::operation_log::delete_operation_log,
        crate::api::operation_log::purge_operation_logs,
    ),
    components(
        schemas(
            LoginRequest,
            SetPasswordRequest,
            BranchCompany,
            Staff,
            CreateStaffRequest,
            UpdateStaffRequest,
            OnboardStaffRequest,
            PromoteStaffRequest,
            TransferStaffRequest,
            ResignStaffRequest,
            Department,
            CreateDepartmentRequest,
            UpdateDepartmentRequest,
            Rank,
            CreateRankRequest,
            UpdateRankRequest,
            AttendanceRecord,
            CreateAttendanceRecordRequest,
            UpdateAttendanceRecordRequest,
            ClockIn,
            CreateClockInRequest,
            UpdateClockInRequest,
            LeaveRequest,
            CreateLeaveRequestRequest,
            UpdateLeaveRequestRequest,
            PunchRequest,
            CreatePunchRequestRequest,
            UpdatePunchRequestRequest,
            Salary,
            SalaryRecord,
            CreateSalaryRequest,
            UpdateSalaryRequest,
            TaxBracket,
            CreateTaxBracketRequest,
            UpdateTaxBracketRequest,
            InsuranceRate,
            InsuranceType,
            CreateInsuranceRateRequest,
            UpdateInsuranceRateRequest,
            CalculationRule,
            RuleType,
            CreateCalculationRuleRequest,
            UpdateCalculationRuleRequest,
            SystemParameter,
            CreateSystemParameterRequest,
            UpdateSystemParameterRequest,
            ParameterHistory,
            SalaryTemplate,
            SalaryTemplateItem,
            ItemType,
            CalculationType,
            TemplateItemRequest,
            CreateTemplateRequest,
            UpdateTemplateRequest,
            ApplyTemplateRequest,
            TemplateAmounts,
            ToggleTemplateRequest,
            Notification,
            CreateNotificationRequest,
            UpdateNotificationRequest,
            Recruitment,
            CreateRecruitmentRequest,
            UpdateRecruitmentRequest,
            Candidate,
            CreateCandidateRequest,
            UpdateCandidateRequest,
        )
    ),
    tags(
        (name = "Account", description = "Login and session management"),
        (name = "Company", description = "Branch company bootstrap listing"),
        (name = "Staff", description = "Staff profiles, lifecycle and bulk import"),
        (name = "Department", description = "Department management"),
        (name = "Rank", description = "Rank management"),
        (name = "Attendance", description = "Monthly attendance records and approvals"),
        (name = "ClockIn", description = "Raw daily punches"),
        (name = "Leave", description = "Leave requests"),
        (name = "Punch", description = "Punch-correction requests"),
        (name = "Salary", description = "Pay structures"),
        (name = "SalaryRecord", description = "Computed monthly salary records"),
        (name = "Tax", description = "Tax bracket configuration"),
        (name = "Insurance", description = "Insurance rate configuration"),
        (name = "Calculation", description = "Calculation rule configuration"),
        (name = "System", description = "System parameters and change history"),
        (name = "Template", description = "Salary templates"),
        (name = "Notification", description = "Notices"),
        (name = "Recruitment", description = "Job postings"),
        (name = "Candidate", description = "Candidates"),
        (name = "OperationLog", description = "Audit trail"),
    )
)]
pub struct ApiDoc;
