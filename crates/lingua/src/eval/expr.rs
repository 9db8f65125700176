//! Expression evaluation: `Expr` + scope -> `Value`.

use super::EvalCtx;
use crate::ast::{BinOp, Expr, UnOp};
use crate::diagnostics::{CResult, SourceLoc};
use crate::value::Value;

impl EvalCtx<'_> {
    pub fn eval_expr(&mut self, expr: &Expr) -> CResult<Value> {
        match expr {
            Expr::Int(v) => Ok(Value::Int(*v)),
            Expr::Float(v) => Ok(Value::Float(*v)),
            Expr::Str(id) => Ok(Value::Str(self.interner.resolve(*id).to_owned())),
            Expr::Bool(v) => Ok(Value::Bool(*v)),
            Expr::Var(name, loc) => self
                .scopes
                .lookup(*name)
                .map(|s| s.value.clone())
                .ok_or_else(|| self.fatal(*loc, format!("undefined variable '{}'", self.interner.resolve(*name)))),
            Expr::Unary { op, expr, loc } => self.eval_unary(*op, expr, *loc),
            Expr::Binary { op, lhs, rhs, loc } => self.eval_binary(*op, lhs, rhs, *loc),
            Expr::Index { target, index, loc } => self.eval_index(target, index, *loc),
            Expr::Slice { target, start, end, loc } => self.eval_slice(target, start.as_deref(), end.as_deref(), *loc),
            Expr::Member { target, field, loc } => self.eval_member(target, *field, *loc),
            Expr::Call { callee, args, loc } => self.eval_call(callee, args, *loc),
            Expr::New { class, args, loc } => self.eval_new(*class, args, *loc),
        }
    }

    fn eval_unary(&mut self, op: UnOp, expr: &Expr, loc: SourceLoc) -> CResult<Value> {
        let v = self.eval_expr(expr)?;
        match (op, &v) {
            (UnOp::Neg, Value::Int(i)) => Ok(Value::Int(-i)),
            (UnOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
            (UnOp::BitNot, Value::Int(i)) => Ok(Value::Int(!i)),
            (UnOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            _ => Err(self.fatal(loc, format!("operator does not apply to a {}", v.type_name()))),
        }
    }

    /// Short-circuits `&&`/`||`: the right operand is only evaluated when
    /// it can affect the result. Every other operator evaluates both
    /// operands before combining them.
    fn eval_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr, loc: SourceLoc) -> CResult<Value> {
        if matches!(op, BinOp::And | BinOp::Or) {
            let l = self.eval_expr(lhs)?;
            let Value::Bool(lb) = l else {
                return Err(self.fatal(loc, "'&&'/'||' require bool operands"));
            };
            if op == BinOp::And && !lb {
                return Ok(Value::Bool(false));
            }
            if op == BinOp::Or && lb {
                return Ok(Value::Bool(true));
            }
            let r = self.eval_expr(rhs)?;
            let Value::Bool(rb) = r else {
                return Err(self.fatal(loc, "'&&'/'||' require bool operands"));
            };
            return Ok(Value::Bool(rb));
        }

        let l = self.eval_expr(lhs)?;
        let r = self.eval_expr(rhs)?;

        if op == BinOp::Add && (matches!(l, Value::Str(_)) || matches!(r, Value::Str(_))) {
            let mut out = l.stringify(self.interner, &self.arena);
            out.push_str(&r.stringify(self.interner, &self.arena));
            return Ok(Value::Str(out));
        }

        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => self.eval_arith(op, &l, &r, loc),
            BinOp::Mod => self.eval_int_pair(&l, &r, loc, "%", |a, b| {
                if b == 0 { Err(()) } else { Ok(a % b) }
            }),
            BinOp::BitAnd => self.eval_int_pair(&l, &r, loc, "&", |a, b| Ok(a & b)),
            BinOp::BitOr => self.eval_int_pair(&l, &r, loc, "|", |a, b| Ok(a | b)),
            BinOp::BitXor => self.eval_int_pair(&l, &r, loc, "^", |a, b| Ok(a ^ b)),
            BinOp::Shl => self.eval_int_pair(&l, &r, loc, "<<", |a, b| Ok(a << b)),
            BinOp::Shr => self.eval_int_pair(&l, &r, loc, ">>", |a, b| Ok(a >> b)),
            BinOp::Eq => self.eval_equality(&l, &r, loc).map(Value::Bool),
            BinOp::Ne => self.eval_equality(&l, &r, loc).map(|b| Value::Bool(!b)),
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => self.eval_relational(op, &l, &r, loc),
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    fn eval_arith(&self, op: BinOp, l: &Value, r: &Value, loc: SourceLoc) -> CResult<Value> {
        match (l, r) {
            (Value::Int(a), Value::Int(b)) => match op {
                BinOp::Add => Ok(Value::Int(a + b)),
                BinOp::Sub => Ok(Value::Int(a - b)),
                BinOp::Mul => Ok(Value::Int(a * b)),
                BinOp::Div => {
                    if *b == 0 {
                        Err(self.fatal(loc, "division by zero"))
                    } else {
                        Ok(Value::Int(a / b))
                    }
                }
                _ => unreachable!(),
            },
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                let a = as_f64(l);
                let b = as_f64(r);
                match op {
                    BinOp::Add => Ok(Value::Float(a + b)),
                    BinOp::Sub => Ok(Value::Float(a - b)),
                    BinOp::Mul => Ok(Value::Float(a * b)),
                    BinOp::Div => {
                        if b == 0.0 {
                            Err(self.fatal(loc, "division by zero"))
                        } else {
                            Ok(Value::Float(a / b))
                        }
                    }
                    _ => unreachable!(),
                }
            }
            _ => Err(self.fatal(loc, format!("arithmetic requires int/float operands, found {} and {}", l.type_name(), r.type_name()))),
        }
    }

    fn eval_int_pair(&self, l: &Value, r: &Value, loc: SourceLoc, op_name: &str, f: impl FnOnce(i64, i64) -> Result<i64, ()>) -> CResult<Value> {
        let (Value::Int(a), Value::Int(b)) = (l, r) else {
            return Err(self.fatal(loc, format!("'{op_name}' requires int operands, found {} and {}", l.type_name(), r.type_name())));
        };
        f(*a, *b).map(Value::Int).map_err(|()| self.fatal(loc, format!("'{op_name}' by zero")))
    }

    /// Equality used by both `==`/`!=` and `match` arm pattern testing —
    /// a pattern tests equality against the scrutinee under the same rules
    /// as `==`.
    pub fn values_equal(&self, l: &Value, r: &Value, loc: SourceLoc) -> CResult<bool> {
        self.eval_equality(l, r, loc)
    }

    fn eval_equality(&self, l: &Value, r: &Value, loc: SourceLoc) -> CResult<bool> {
        Ok(match (l, r) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => as_f64(l) == as_f64(r),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Void, Value::Void) => true,
            _ => return Err(self.fatal(loc, format!("cannot compare {} with {}", l.type_name(), r.type_name()))),
        })
    }

    fn eval_relational(&self, op: BinOp, l: &Value, r: &Value, loc: SourceLoc) -> CResult<Value> {
        if matches!(l, Value::Bool(_)) || matches!(r, Value::Bool(_)) {
            return Err(self.fatal(loc, "'bool' is not ordered"));
        }
        let ordering = match (l, r) {
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => as_f64(l).partial_cmp(&as_f64(r)),
            (Value::Str(a), Value::Str(b)) => a.as_bytes().partial_cmp(b.as_bytes()),
            _ => return Err(self.fatal(loc, format!("cannot order {} and {}", l.type_name(), r.type_name()))),
        };
        let Some(ordering) = ordering else {
            return Err(self.fatal(loc, "values are not comparable"));
        };
        Ok(Value::Bool(match op {
            BinOp::Lt => ordering.is_lt(),
            BinOp::Le => ordering.is_le(),
            BinOp::Gt => ordering.is_gt(),
            BinOp::Ge => ordering.is_ge(),
            _ => unreachable!(),
        }))
    }

    fn eval_index(&mut self, target: &Expr, index: &Expr, loc: SourceLoc) -> CResult<Value> {
        let target = self.eval_expr(target)?;
        let Value::Str(s) = target else {
            return Err(self.fatal(loc, "indexing requires a string"));
        };
        let Value::Int(i) = self.eval_expr(index)? else {
            return Err(self.fatal(loc, "string index must be an int"));
        };
        let bytes = s.as_bytes();
        let len = bytes.len() as i64;
        let resolved = if i < 0 { i + len } else { i };
        if resolved < 0 || resolved >= len {
            return Err(self.fatal(loc, format!("string index {i} out of range for length {len}")));
        }
        Ok(Value::Str(String::from_utf8_lossy(&[bytes[resolved as usize]]).into_owned()))
    }

    fn eval_slice(&mut self, target: &Expr, start: Option<&Expr>, end: Option<&Expr>, loc: SourceLoc) -> CResult<Value> {
        let target = self.eval_expr(target)?;
        let Value::Str(s) = target else {
            return Err(self.fatal(loc, "slicing requires a string"));
        };
        let bytes = s.as_bytes();
        let len = bytes.len() as i64;

        let resolve = |v: i64| if v < 0 { v + len } else { v };
        let a = match start {
            Some(e) => {
                let Value::Int(v) = self.eval_expr(e)? else {
                    return Err(self.fatal(loc, "slice bound must be an int"));
                };
                resolve(v).clamp(0, len)
            }
            None => 0,
        };
        let b = match end {
            Some(e) => {
                let Value::Int(v) = self.eval_expr(e)? else {
                    return Err(self.fatal(loc, "slice bound must be an int"));
                };
                resolve(v).clamp(0, len)
            }
            None => len,
        };
        if a >= b {
            return Ok(Value::Str(String::new()));
        }
        Ok(Value::Str(String::from_utf8_lossy(&bytes[a as usize..b as usize]).into_owned()))
    }

    fn eval_member(&mut self, target: &Expr, field: crate::intern::StringId, loc: SourceLoc) -> CResult<Value> {
        let target = self.eval_expr(target)?;
        let Value::Object(id) = target else {
            return Err(self.fatal(loc, "member access requires an object"));
        };
        self.arena
            .get(id)
            .get(field)
            .cloned()
            .ok_or_else(|| self.fatal(loc, format!("unknown field '{}'", self.interner.resolve(field))))
    }
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        _ => unreachable!("caller already matched numeric variants"),
    }
}
