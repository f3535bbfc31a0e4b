//! Payroll calculation: a staff member's pay structure plus a month's
//! attendance aggregates plus the active parameter-store rows produce one
//! salary record. The arithmetic itself is pure; the orchestration wraps the
//! approval flag and the record upsert in a single transaction.

use sqlx::MySqlPool;

use crate::model::attendance::{APPROVE_ACCEPTED, AttendanceRecord};
use crate::model::parameter::{CalculationRule, InsuranceRate, InsuranceType, RuleKind, TaxBracket};
use crate::model::salary::{IS_PAY_COMPUTED, IS_PAY_PAID, Salary, SalaryRecord};
use crate::response::AppError;
use crate::service::parameter_store;
use crate::utils::ids::new_id;

/// Snapshot of the active parameter-store rows the calculator consumes.
/// All monetary values are raw stored cents.
#[derive(Debug, Clone)]
pub struct PayrollParams {
    pub monthly_work_days: f64,
    pub tax_threshold: f64,
    pub leave_rules: Vec<CalculationRule>,
    pub overtime_rules: Vec<CalculationRule>,
    pub insurance_rates: Vec<InsuranceRate>,
    pub tax_brackets: Vec<TaxBracket>,
}

impl PayrollParams {
    pub async fn load(pool: &MySqlPool) -> Result<Self, AppError> {
        let monthly_work_days = parameter_store::get_system_parameter_value(pool, "monthly_work_days")
            .await?
            .parse::<f64>()
            .map_err(|_| AppError::Computation("monthly_work_days is not numeric".to_string()))?;
        if monthly_work_days <= 0.0 {
            return Err(AppError::Computation(
                "monthly_work_days must be positive".to_string(),
            ));
        }
        let tax_threshold = parameter_store::get_system_parameter_value(pool, "tax_threshold")
            .await?
            .parse::<f64>()
            .map_err(|_| AppError::Computation("tax_threshold is not numeric".to_string()))?;

        Ok(Self {
            monthly_work_days,
            tax_threshold,
            leave_rules: parameter_store::active_rules_by_type(pool, "leave").await?,
            overtime_rules: parameter_store::active_rules_by_type(pool, "overtime").await?,
            insurance_rates: parameter_store::active_insurance_rates(pool).await?,
            tax_brackets: parameter_store::active_tax_brackets(pool).await?,
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct InsuranceDeductions {
    pub pension: f64,
    pub medical: f64,
    pub unemployment: f64,
    pub housing: f64,
}

/// Performance bonus tapered by personal-leave days: one fifth is withheld
/// per day, everything past five days forfeits the bonus. The named rule
/// lookup and its fallback apply the identical formula, so a missing rule row
/// changes nothing observable.
pub fn taper_bonus(bonus: i64, leave_days: i64, leave_rules: &[CalculationRule]) -> i64 {
    let _rule = leave_rules
        .iter()
        .find(|r| RuleKind::from_rule_name(&r.rule_name) == Some(RuleKind::LeaveDeduction));
    if leave_days > 5 {
        return 0;
    }
    let factor = (5 - leave_days) as f64 / 5.0;
    (bonus as f64 * factor) as i64
}

/// First overtime rule whose name maps to a known kind wins; an empty or
/// unrecognized rule set falls back to the weekday multiplier.
pub fn overtime_multiplier(overtime_rules: &[CalculationRule]) -> f64 {
    for rule in overtime_rules {
        if let Some(multiplier) = RuleKind::from_rule_name(&rule.rule_name)
            .and_then(|kind| kind.overtime_multiplier())
        {
            return multiplier;
        }
    }
    1.5
}

/// Overtime pay from the pro-rated base's daily rate, truncated to cents.
pub fn overtime_pay(
    prorated_base: i64,
    overtime_days: i64,
    monthly_work_days: f64,
    overtime_rules: &[CalculationRule],
) -> i64 {
    if overtime_days == 0 {
        return 0;
    }
    let daily_rate = prorated_base as f64 / monthly_work_days;
    (daily_rate * overtime_multiplier(overtime_rules) * overtime_days as f64) as i64
}

/// Employee-side statutory deductions, assigned per insurance type. Injury
/// and maternity carry employer-only rates and never reduce pay here.
pub fn insurance_deductions(gross: f64, rates: &[InsuranceRate]) -> InsuranceDeductions {
    let mut deductions = InsuranceDeductions::default();
    for rate in rates {
        let share = gross * (rate.employee_rate / 100.0);
        match rate.kind() {
            Some(InsuranceType::Pension) => deductions.pension = share,
            Some(InsuranceType::Medical) => deductions.medical = share,
            Some(InsuranceType::Unemployment) => deductions.unemployment = share,
            Some(InsuranceType::Housing) => deductions.housing = share,
            _ => {}
        }
    }
    deductions
}

/// Income tax over the post-deduction amount. At or below the threshold no
/// tax is due; above it the single bracket containing `taxable − threshold`
/// applies (`max_income == 0` is the open-ended top bracket, which also
/// serves as the fallback when no bounded bracket matches).
pub fn income_tax(taxable: f64, threshold: f64, brackets: &[TaxBracket]) -> Result<f64, AppError> {
    if taxable <= threshold {
        return Ok(0.0);
    }
    if brackets.is_empty() {
        return Err(AppError::Computation("no active tax brackets".to_string()));
    }

    let amount = taxable - threshold;
    for bracket in brackets {
        if amount >= bracket.min_income as f64
            && (bracket.max_income == 0 || amount <= bracket.max_income as f64)
        {
            let tax = amount * bracket.tax_rate / 100.0 - bracket.quick_deduction as f64;
            return Ok(tax.max(0.0));
        }
    }
    for bracket in brackets {
        if bracket.max_income == 0 {
            let tax = amount * bracket.tax_rate / 100.0 - bracket.quick_deduction as f64;
            return Ok(tax.max(0.0));
        }
    }
    Ok(0.0)
}

/// The whole pipeline, pure over its inputs. Amounts in `salary` are cents;
/// the returned record carries `is_pay = 1` (computed, unpaid).
pub fn calculate(
    salary: &Salary,
    attendance: &AttendanceRecord,
    params: &PayrollParams,
) -> Result<SalaryRecord, AppError> {
    if params.monthly_work_days <= 0.0 {
        return Err(AppError::Computation(
            "monthly_work_days must be positive".to_string(),
        ));
    }

    let prorated_base =
        ((salary.base as f64 / params.monthly_work_days) * attendance.work_days as f64) as i64;
    let bonus = taper_bonus(salary.bonus, attendance.leave_days, &params.leave_rules);
    let overtime = overtime_pay(
        prorated_base,
        attendance.overtime_days,
        params.monthly_work_days,
        &params.overtime_rules,
    );

    let gross =
        (overtime + prorated_base + salary.subsidy + bonus + salary.commission + salary.other) as f64;

    let deductions = if salary.fund == 1 {
        insurance_deductions(gross, &params.insurance_rates)
    } else {
        InsuranceDeductions::default()
    };

    let taxable = gross
        - deductions.pension
        - deductions.medical
        - deductions.unemployment
        - deductions.housing;
    let tax = income_tax(taxable, params.tax_threshold, &params.tax_brackets)?;
    let total = taxable - tax;

    Ok(SalaryRecord {
        id: 0,
        salary_record_id: new_id("salary_record"),
        staff_id: salary.staff_id.clone(),
        staff_name: salary.staff_name.clone(),
        base: prorated_base,
        subsidy: salary.subsidy,
        bonus,
        commission: salary.commission,
        overtime,
        other: salary.other,
        tax,
        pension_insurance: deductions.pension,
        medical_insurance: deductions.medical,
        unemployment_insurance: deductions.unemployment,
        housing_fund: deductions.housing,
        total,
        is_pay: IS_PAY_COMPUTED,
        salary_date: attendance.date.clone(),
    })
}

/// Approve an attendance record and compute its month's salary as one unit of
/// work: the approve flag and the salary upsert both land or neither does.
/// Fails with Conflict once the month's record has been paid out.
pub async fn compute_for_attendance(pool: &MySqlPool, attendance_id: &str) -> Result<(), AppError> {
    let params = PayrollParams::load(pool).await?;

    let mut tx = pool.begin().await?;

    let attendance = sqlx::query_as::<_, AttendanceRecord>(
        "SELECT id, attendance_id, staff_id, staff_name, date, work_days, leave_days, \
         overtime_days, approve FROM attendance_record WHERE attendance_id = ?",
    )
    .bind(attendance_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("attendance record {attendance_id} not found")))?;

    sqlx::query("UPDATE attendance_record SET approve = ? WHERE attendance_id = ?")
        .bind(APPROVE_ACCEPTED)
        .bind(attendance_id)
        .execute(&mut *tx)
        .await?;

    let salary = sqlx::query_as::<_, Salary>(
        "SELECT id, salary_id, staff_id, staff_name, base, subsidy, bonus, commission, other, fund \
         FROM salary WHERE staff_id = ?",
    )
    .bind(&attendance.staff_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!(
            "no salary configuration for staff {}",
            attendance.staff_id
        ))
    })?;

    let existing = sqlx::query_as::<_, (u64, i64)>(
        "SELECT id, is_pay FROM salary_record WHERE staff_id = ? AND salary_date = ?",
    )
    .bind(&attendance.staff_id)
    .bind(&attendance.date)
    .fetch_optional(&mut *tx)
    .await?;

    if let Some((_, is_pay)) = existing {
        if is_pay == IS_PAY_PAID {
            return Err(AppError::Conflict(format!(
                "salary for {} {} is already paid",
                attendance.staff_id, attendance.date
            )));
        }
    }

    let record = calculate(&salary, &attendance, &params)?;

    match existing {
        Some((record_id, _)) => {
            sqlx::query(
                "UPDATE salary_record SET staff_name = ?, base = ?, subsidy = ?, bonus = ?, \
                 commission = ?, overtime = ?, other = ?, tax = ?, pension_insurance = ?, \
                 medical_insurance = ?, unemployment_insurance = ?, housing_fund = ?, total = ?, \
                 is_pay = ? WHERE id = ?",
            )
            .bind(&record.staff_name)
            .bind(record.base)
            .bind(record.subsidy)
            .bind(record.bonus)
            .bind(record.commission)
            .bind(record.overtime)
            .bind(record.other)
            .bind(record.tax)
            .bind(record.pension_insurance)
            .bind(record.medical_insurance)
            .bind(record.unemployment_insurance)
            .bind(record.housing_fund)
            .bind(record.total)
            .bind(record.is_pay)
            .bind(record_id)
            .execute(&mut *tx)
            .await?;
        }
        None => {
            sqlx::query(
                "INSERT INTO salary_record \
                 (salary_record_id, staff_id, staff_name, base, subsidy, bonus, commission, \
                  overtime, other, tax, pension_insurance, medical_insurance, \
                  unemployment_insurance, housing_fund, total, is_pay, salary_date) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&record.salary_record_id)
            .bind(&record.staff_id)
            .bind(&record.staff_name)
            .bind(record.base)
            .bind(record.subsidy)
            .bind(record.bonus)
            .bind(record.commission)
            .bind(record.overtime)
            .bind(record.other)
            .bind(record.tax)
            .bind(record.pension_insurance)
            .bind(record.medical_insurance)
            .bind(record.unemployment_insurance)
            .bind(record.housing_fund)
            .bind(record.total)
            .bind(record.is_pay)
            .bind(&record.salary_date)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

/// Mark a computed record paid. Terminal: paying twice is a Conflict.
pub async fn pay_salary_record(pool: &MySqlPool, id: u64) -> Result<(), AppError> {
    let current = sqlx::query_as::<_, (i64,)>("SELECT is_pay FROM salary_record WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("salary record {id} not found")))?;

    if current.0 == IS_PAY_PAID {
        return Err(AppError::Conflict(format!("salary record {id} is already paid")));
    }

    sqlx::query("UPDATE salary_record SET is_pay = ? WHERE id = ?")
        .bind(IS_PAY_PAID)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn rule(rule_type: &str, rule_name: &str) -> CalculationRule {
        CalculationRule {
            id: 1,
            calculation_rule_id: "calculation_rule_test".to_string(),
            rule_type: rule_type.to_string(),
            rule_name: rule_name.to_string(),
            rule_value: 0.0,
            rule_description: None,
            is_active: true,
            effective_date: date(),
            created_by: "t".to_string(),
            updated_by: "t".to_string(),
        }
    }

    fn insurance(insurance_type: &str, employee_rate: f64) -> InsuranceRate {
        InsuranceRate {
            id: 1,
            insurance_rate_id: "insurance_rate_test".to_string(),
            insurance_type: insurance_type.to_string(),
            employee_rate,
            employer_rate: employee_rate * 2.0,
            min_base: 0,
            max_base: 0,
            description: None,
            is_active: true,
            effective_date: date(),
            created_by: "t".to_string(),
            updated_by: "t".to_string(),
        }
    }

    fn bracket(min: i64, max: i64, rate: f64, quick_deduction: i64) -> TaxBracket {
        TaxBracket {
            id: 1,
            tax_bracket_id: "tax_bracket_test".to_string(),
            min_income: min,
            max_income: max,
            tax_rate: rate,
            quick_deduction,
            description: None,
            is_active: true,
            effective_date: date(),
            created_by: "t".to_string(),
            updated_by: "t".to_string(),
        }
    }

    // Statutory monthly brackets, in cents.
    fn standard_brackets() -> Vec<TaxBracket> {
        vec![
            bracket(0, 300_000, 3.0, 0),
            bracket(300_000, 1_200_000, 10.0, 21_000),
            bracket(1_200_000, 2_500_000, 20.0, 141_000),
            bracket(2_500_000, 3_500_000, 25.0, 266_000),
            bracket(3_500_000, 0, 30.0, 441_000),
        ]
    }

    fn salary_fixture(base: i64, bonus: i64, fund: i64) -> Salary {
        Salary {
            id: 1,
            salary_id: "salary_test".to_string(),
            staff_id: "H1a2b3".to_string(),
            staff_name: "张三".to_string(),
            base,
            subsidy: 0,
            bonus,
            commission: 0,
            other: 0,
            fund,
        }
    }

    fn attendance_fixture(work: i64, leave: i64, overtime: i64) -> AttendanceRecord {
        AttendanceRecord {
            id: 1,
            attendance_id: "attendance_record_test".to_string(),
            staff_id: "H1a2b3".to_string(),
            staff_name: "张三".to_string(),
            date: "2024-06".to_string(),
            work_days: work,
            leave_days: leave,
            overtime_days: overtime,
            approve: 0,
        }
    }

    fn params_fixture() -> PayrollParams {
        PayrollParams {
            monthly_work_days: 22.0,
            tax_threshold: 500_000.0,
            leave_rules: vec![rule("leave", "事假扣款计算")],
            overtime_rules: vec![rule("overtime", "工作日加班计算")],
            insurance_rates: vec![
                insurance("pension", 8.0),
                insurance("medical", 2.0),
                insurance("unemployment", 0.5),
                insurance("housing", 7.0),
            ],
            tax_brackets: standard_brackets(),
        }
    }

    #[test]
    fn tax_is_zero_at_or_below_threshold() {
        let brackets = standard_brackets();
        assert_eq!(income_tax(500_000.0, 500_000.0, &brackets).unwrap(), 0.0);
        assert_eq!(income_tax(100.0, 500_000.0, &brackets).unwrap(), 0.0);
    }

    #[test]
    fn tax_is_monotonically_non_decreasing() {
        let brackets = standard_brackets();
        let mut previous = 0.0;
        for step in 0..200 {
            let taxable = step as f64 * 50_000.0;
            let tax = income_tax(taxable, 500_000.0, &brackets).unwrap();
            assert!(
                tax >= previous,
                "tax regressed at taxable={taxable}: {tax} < {previous}"
            );
            previous = tax;
        }
    }

    #[test]
    fn tax_falls_back_to_open_ended_bracket() {
        // Only a bounded low bracket plus the open top one; an amount past the
        // bounded range must land on the open-ended bracket.
        let brackets = vec![bracket(0, 300_000, 3.0, 0), bracket(500_000, 0, 30.0, 441_000)];
        let tax = income_tax(900_000.0, 500_000.0, &brackets).unwrap();
        // amount = 400000, between the two ranges: open-ended fallback applies.
        assert_eq!(tax, (400_000.0f64 * 0.30 - 441_000.0).max(0.0));
    }

    #[test]
    fn empty_brackets_fail_only_above_threshold() {
        assert_eq!(income_tax(100.0, 500_000.0, &[]).unwrap(), 0.0);
        assert!(income_tax(600_000.0, 500_000.0, &[]).is_err());
    }

    #[test]
    fn leave_taper_matches_fifths() {
        let rules = vec![rule("leave", "事假扣款计算")];
        assert_eq!(taper_bonus(100_000, 0, &rules), 100_000);
        assert_eq!(taper_bonus(100_000, 3, &rules), 40_000);
        assert_eq!(taper_bonus(100_000, 5, &rules), 0);
        assert_eq!(taper_bonus(100_000, 6, &rules), 0);
    }

    #[test]
    fn leave_taper_fallback_is_identical_without_the_rule() {
        assert_eq!(taper_bonus(100_000, 3, &[]), 40_000);
        assert_eq!(taper_bonus(100_000, 6, &[]), 0);
    }

    #[test]
    fn overtime_multiplier_follows_first_known_rule() {
        assert_eq!(overtime_multiplier(&[rule("overtime", "工作日加班计算")]), 1.5);
        assert_eq!(overtime_multiplier(&[rule("overtime", "周末加班计算")]), 2.0);
        assert_eq!(overtime_multiplier(&[rule("overtime", "法定节假日加班计算")]), 3.0);
        assert_eq!(overtime_multiplier(&[rule("overtime", "renamed")]), 1.5);
        assert_eq!(overtime_multiplier(&[]), 1.5);
    }

    #[test]
    fn no_overtime_days_means_no_overtime_pay() {
        assert_eq!(overtime_pay(500_000, 0, 22.0, &[]), 0);
    }

    #[test]
    fn injury_and_maternity_never_reduce_pay() {
        let rates = vec![
            insurance("pension", 8.0),
            insurance("injury", 1.0),
            insurance("maternity", 1.0),
        ];
        let deductions = insurance_deductions(1_000_000.0, &rates);
        assert_eq!(deductions.pension, 80_000.0);
        assert_eq!(deductions.medical, 0.0);
        assert_eq!(deductions.unemployment, 0.0);
        assert_eq!(deductions.housing, 0.0);
    }

    #[test]
    fn full_month_no_fund_keeps_gross_components() {
        let salary = salary_fixture(2_200_000, 0, 0);
        let attendance = attendance_fixture(22, 0, 0);
        let record = calculate(&salary, &attendance, &params_fixture()).unwrap();
        assert_eq!(record.base, 2_200_000);
        assert_eq!(record.overtime, 0);
        assert_eq!(record.pension_insurance, 0.0);
        assert_eq!(record.total, record.base as f64 - record.tax);
        assert_eq!(record.is_pay, IS_PAY_COMPUTED);
    }

    #[test]
    fn end_to_end_compute_shape() {
        // base 500000 cents, fund enrolled, 22/22 days worked, 2 overtime days
        let salary = salary_fixture(500_000, 0, 1);
        let attendance = attendance_fixture(22, 0, 2);
        let record = calculate(&salary, &attendance, &params_fixture()).unwrap();

        assert!(record.overtime > 0);
        assert!(record.tax >= 0.0);
        let taxable = (record.overtime + record.base) as f64
            - record.pension_insurance
            - record.medical_insurance
            - record.unemployment_insurance
            - record.housing_fund;
        assert!((record.total - (taxable - record.tax)).abs() < 1e-6);
        assert_eq!(record.is_pay, IS_PAY_COMPUTED);
        assert_eq!(record.salary_date, "2024-06");
    }

    #[test]
    fn calculation_is_deterministic_for_unchanged_inputs() {
        let salary = salary_fixture(1_000_000, 100_000, 1);
        let attendance = attendance_fixture(20, 2, 1);
        let params = params_fixture();
        let first = calculate(&salary, &attendance, &params).unwrap();
        let second = calculate(&salary, &attendance, &params).unwrap();
        assert_eq!(first.base, second.base);
        assert_eq!(first.bonus, second.bonus);
        assert_eq!(first.overtime, second.overtime);
        assert_eq!(first.tax, second.tax);
        assert_eq!(first.total, second.total);
    }

    #[test]
    fn partial_month_prorates_base() {
        let salary = salary_fixture(2_200_000, 0, 0);
        let attendance = attendance_fixture(11, 0, 0);
        let record = calculate(&salary, &attendance, &params_fixture()).unwrap();
        assert_eq!(record.base, 1_100_000);
    }
}
